//! Last-resort recovery for a render context that stalls while the tab is hidden.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Healthy,
    /// The canvas came back blank; reload the page.
    Reload,
}

/// Arms once per reactivation; the host runs [`Watchdog::check`] after the
/// configured delay with a small pixel sample from the canvas.
#[derive(Debug, Clone, Default)]
pub struct Watchdog {
    armed: bool,
}

impl Watchdog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns `true` when the host should schedule a check.
    pub fn on_visible(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        true
    }

    pub fn check(&mut self, pixels: &[u8]) -> Recovery {
        self.armed = false;
        if canvas_has_content(pixels) {
            Recovery::Healthy
        } else {
            log::info!("canvas is blank after reactivation; reloading");
            Recovery::Reload
        }
    }
}

/// Any nonzero RGBA byte counts as rendered content.
pub fn canvas_has_content(pixels: &[u8]) -> bool {
    pixels.iter().any(|&byte| byte != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arms_once_until_checked() {
        let mut watchdog = Watchdog::new();
        assert!(watchdog.on_visible());
        assert!(!watchdog.on_visible());
        watchdog.check(&[0, 0, 0, 255]);
        assert!(watchdog.on_visible());
    }

    #[test]
    fn blank_sample_requests_reload() {
        let mut watchdog = Watchdog::new();
        watchdog.on_visible();
        assert_eq!(watchdog.check(&[0; 400]), Recovery::Reload);
        assert!(!watchdog.is_armed());
    }

    #[test]
    fn opaque_black_is_content() {
        let mut watchdog = Watchdog::new();
        watchdog.on_visible();
        // painted black background: rgb 0, alpha 255
        let sample: Vec<u8> = [0, 0, 0, 255].repeat(100);
        assert_eq!(watchdog.check(&sample), Recovery::Healthy);
    }
}
