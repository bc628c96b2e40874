// Portal HTML → EventSection.
//
// A "Current events" month page holds one block per day, `div` with id
// `{year}_{MonthName}_{day}`. The first child of the block is the date
// heading; the rest wrap the content, which is a run of `<p>` category
// headings and `<ul>` event lists. List items nest further `<ul>`s for tag
// groups.
//
// This module only maps markup onto node shapes. Judging whether the shapes
// make sense is the walker's job, so odd markup (a `<ul>` directly inside a
// `<ul>`) is passed through as-is and reported there.

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::tree::{EventNode, EventSection, Link};

/// Element id of a day's block on the month page, e.g. `2022_January_1`.
pub fn day_block_id(date: NaiveDate) -> String {
    format!("{}_{}_{}", date.year(), date.format("%B"), date.day())
}

/// Parse the section for `date` out of a month page. A page without that
/// day's block yields an empty section.
pub fn parse_day_section(html: &str, date: NaiveDate) -> Result<EventSection> {
    let document = Html::parse_document(html);
    // Ids starting with a digit aren't valid in `#id` selectors.
    let selector = Selector::parse(&format!("div[id=\"{}\"]", day_block_id(date)))
        .map_err(|e| anyhow!("Invalid day block selector: {e}"))?;

    let Some(day) = document.select(&selector).next() else {
        debug!(date = %date, "Day block not found on page");
        return Ok(EventSection::empty(date));
    };

    let mut nodes = Vec::new();
    for block in child_elements(day).skip(1) {
        for el in child_elements(block) {
            match el.value().name() {
                "p" => nodes.push(EventNode::Marker {
                    text: el.text().collect(),
                }),
                "ul" => nodes.push(EventNode::List {
                    items: list_items(el),
                }),
                other => debug!(tag = other, "Ignoring element in day block"),
            }
        }
    }

    Ok(EventSection::new(date, nodes))
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children().filter_map(ElementRef::wrap)
}

fn list_items(ul: ElementRef<'_>) -> Vec<EventNode> {
    child_elements(ul)
        .filter_map(|child| match child.value().name() {
            "li" => Some(item_node(child)),
            "ul" => Some(EventNode::List {
                items: list_items(child),
            }),
            _ => None,
        })
        .collect()
}

fn item_node(li: ElementRef<'_>) -> EventNode {
    let nested_lists: Vec<ElementRef> = child_elements(li)
        .filter(|c| c.value().name() == "ul")
        .collect();

    if nested_lists.is_empty() {
        let links = child_elements(li)
            .filter(|c| c.value().name() == "a")
            .filter_map(|a| {
                a.value().attr("href").map(|href| Link {
                    href: href.to_string(),
                    citation: a.value().attr("rel").is_some(),
                })
            })
            .collect();
        return EventNode::Item {
            text: li.text().collect::<String>().trim().to_string(),
            links,
            nested: None,
        };
    }

    // The label is everything in the item except its nested lists.
    let mut label = String::new();
    let mut links = Vec::new();
    for child in li.children() {
        if let Some(el) = ElementRef::wrap(child) {
            if el.value().name() == "ul" {
                continue;
            }
            label.extend(el.text());
            if let Some(href) = el.value().attr("href") {
                links.push(Link::internal(href));
            }
        } else if let Some(text) = child.value().as_text() {
            label.push_str(text);
        }
    }

    let nested = nested_lists.into_iter().flat_map(list_items).collect();

    EventNode::Item {
        text: label.trim().to_string(),
        links,
        nested: Some(nested),
    }
}
