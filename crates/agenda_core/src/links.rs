use crate::dom::Anchor;
use crate::error::ExtractError;
use crate::schema::Link;

/// Turns an anchor into a [`Link`]. The tail text is not part of the link.
pub fn to_link(anchor: &Anchor) -> Result<Link, ExtractError> {
    let url = anchor
        .href
        .clone()
        .ok_or_else(|| ExtractError::MissingHref(anchor.text.clone()))?;
    Ok(Link {
        text: anchor.text.clone(),
        title: anchor.title.clone(),
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_text_title_and_target() {
        let anchor = Anchor {
            href: Some("http://www.fec.gov/agenda/2011/mtgdoc1101.pdf".to_string()),
            title: Some("Minutes".to_string()),
            text: "January 6, 2011".to_string(),
            tail: " (Draft)".to_string(),
        };
        let link = to_link(&anchor).unwrap();
        assert_eq!(link.text, "January 6, 2011");
        assert_eq!(link.title.as_deref(), Some("Minutes"));
        assert_eq!(link.url, "http://www.fec.gov/agenda/2011/mtgdoc1101.pdf");
    }

    #[test]
    fn anchor_without_target_is_rejected() {
        let anchor = Anchor {
            href: None,
            title: None,
            text: "orphan".to_string(),
            tail: String::new(),
        };
        assert!(matches!(to_link(&anchor), Err(ExtractError::MissingHref(text)) if text == "orphan"));
    }
}
