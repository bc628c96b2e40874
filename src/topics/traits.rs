// Term weighter trait.
//
// The clustering engine only sees WeightedVectors. Where they come from is
// up to the weighter: the default is corpus TF-IDF, but anything that maps a
// text to non-negative term weights fits here.

use super::vector::WeightedVector;

/// Maps a text to a sparse term-weight vector.
pub trait TermWeighter {
    fn weigh(&self, text: &str) -> WeightedVector;
}
