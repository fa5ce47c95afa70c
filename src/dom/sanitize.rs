//! Page sanitization before parsing
//!
//! Script and style bodies are character data too; left in place they would
//! be candidates for the full-text fallback. Uses lol_html so the page is
//! rewritten in a single streaming pass.
//!
//! Elements are emptied, never removed: selections arrive as child indices
//! into the unsanitized page, and dropping an element would shift those
//! indices and let the parser merge the text on either side.

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};

/// Errors during sanitization
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

/// Empty script and style bodies, strip inline handlers and `javascript:` URLs
pub fn sanitize_html(html: &str) -> Result<String, SanitizeError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script, style, noscript, template", |el| {
                    el.set_inner_content("", ContentType::Text);
                    Ok(())
                }),
                element!("*", |el| {
                    let handlers: Vec<String> = el
                        .attributes()
                        .iter()
                        .map(|attr| attr.name())
                        .filter(|name| name.to_ascii_lowercase().starts_with("on"))
                        .collect();
                    for name in &handlers {
                        el.remove_attribute(name);
                    }
                    for attr in ["href", "src"] {
                        let scripted = el
                            .get_attribute(attr)
                            .map(|value| value.trim().to_lowercase().starts_with("javascript:"))
                            .unwrap_or(false);
                        if scripted {
                            el.remove_attribute(attr);
                        }
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| SanitizeError::Rewrite(e.to_string()))
}
