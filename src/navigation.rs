//! Deciding which link clicks should flush the animation state first.

/// Name of the window event that asks the simulation to save immediately.
pub const SAVE_EVENT: &str = "save-animation-state";

/// The attributes of a clicked `<a>` element that matter for navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTarget<'a> {
    pub href: Option<&'a str>,
    /// Origin the link resolves to.
    pub origin: &'a str,
    /// Origin of the current page.
    pub page_origin: &'a str,
    pub download: bool,
    pub target: Option<&'a str>,
}

/// True for same-origin page navigations: not fragments, downloads, or new tabs.
pub fn should_save_before_navigation(link: &LinkTarget<'_>) -> bool {
    let Some(href) = link.href.filter(|href| !href.is_empty()) else {
        return false;
    };
    link.origin == link.page_origin
        && !href.starts_with('#')
        && !link.download
        && link.target != Some("_blank")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str) -> LinkTarget<'_> {
        LinkTarget {
            href: Some(href),
            origin: "https://example.org",
            page_origin: "https://example.org",
            download: false,
            target: None,
        }
    }

    #[test]
    fn internal_link_saves() {
        assert!(should_save_before_navigation(&link("/posts/reef/")));
    }

    #[test]
    fn skipped_links() {
        assert!(!should_save_before_navigation(&link("#footnote-1")));
        assert!(!should_save_before_navigation(&LinkTarget {
            origin: "https://elsewhere.net",
            ..link("https://elsewhere.net/")
        }));
        assert!(!should_save_before_navigation(&LinkTarget {
            download: true,
            ..link("/reef.pdf")
        }));
        assert!(!should_save_before_navigation(&LinkTarget {
            target: Some("_blank"),
            ..link("/about/")
        }));
        assert!(!should_save_before_navigation(&LinkTarget {
            href: None,
            ..link("")
        }));
    }
}
