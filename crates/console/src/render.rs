//! Plain-text and JSON rendering of command results.

use std::io::Write;

use models::{Association, Contact, Deal, StoredAssociation};
use serde::Serialize;

pub fn contact_line(c: &Contact) -> String {
    let name = c.display_name();
    if name.is_empty() {
        format!("{:<8} {}", c.id, c.email())
    } else {
        format!("{:<8} {} <{}>", c.id, name, c.email())
    }
}

pub fn deal_line(d: &Deal) -> String {
    let mut line = format!("{:<8} {}", d.id, d.name());
    if let Some(amount) = d.properties.amount.as_deref().filter(|a| !a.is_empty()) {
        line.push_str(&format!("  [{amount}]"));
    }
    if let Some(stage) = d.properties.dealstage.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!("  ({stage})"));
    }
    line
}

pub fn association_line(a: &Association) -> String {
    let show = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };
    format!("contact: {}  deal: {}", show(&a.email), show(&a.deal_id))
}

pub fn link_line(l: &StoredAssociation) -> String {
    format!("#{:<5} {} -> {}", l.id, l.email, l.deal_id)
}

/// Write `items` as a JSON array, or one line each via `line`.
pub fn list<T: Serialize>(
    out: &mut impl Write,
    items: &[T],
    json: bool,
    line: fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(items)?)?;
        return Ok(());
    }
    if items.is_empty() {
        writeln!(out, "(none)")?;
    }
    for item in items {
        writeln!(out, "{}", line(item))?;
    }
    Ok(())
}

pub fn one<T: Serialize>(out: &mut impl Write, item: &T, json: bool, line: fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(item)?)?;
    } else {
        writeln!(out, "{}", line(item))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(first: Option<&str>, last: Option<&str>) -> Contact {
        serde_json::from_value(serde_json::json!({
            "id": "7",
            "properties": { "email": "ada@example.com", "firstname": first, "lastname": last }
        }))
        .unwrap()
    }

    #[test]
    fn contact_without_name_shows_email_only() {
        assert_eq!(contact_line(&contact(None, None)), "7        ada@example.com");
        assert_eq!(contact_line(&contact(Some("Ada"), Some("Lovelace"))), "7        Ada Lovelace <ada@example.com>");
    }

    #[test]
    fn deal_line_includes_amount_and_stage_when_known() {
        let deal: Deal = serde_json::from_value(serde_json::json!({
            "id": "D1",
            "properties": { "dealname": "Renewal", "amount": "1200", "dealstage": "closedwon" }
        }))
        .unwrap();
        assert_eq!(deal_line(&deal), "D1       Renewal  [1200]  (closedwon)");
    }

    #[test]
    fn empty_association_fields_render_as_dash() {
        assert_eq!(association_line(&Association::default()), "contact: -  deal: -");
        assert_eq!(association_line(&Association::new("a@b.com", "")), "contact: a@b.com  deal: -");
    }

    #[test]
    fn empty_list_text_and_json() {
        let mut text = Vec::new();
        list::<StoredAssociation>(&mut text, &[], false, link_line).unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), "(none)\n");

        let mut json = Vec::new();
        list::<StoredAssociation>(&mut json, &[], true, link_line).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), "[]\n");
    }
}
