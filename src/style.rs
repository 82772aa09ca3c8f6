//! ANSI palette for the tree renderer.

const BOLD_CYAN: &str = "\x1b[1;36m";
const WHITE: &str = "\x1b[37m";
const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const MAGENTA: &str = "\x1b[35m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Color roles used by the renderers. A disabled palette returns text as-is.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn label(&self, text: &str) -> String {
        self.paint(BOLD_CYAN, text)
    }

    pub fn value(&self, text: &str) -> String {
        self.paint(WHITE, text)
    }

    pub fn tree(&self, text: &str) -> String {
        self.paint(BLUE, text)
    }

    pub fn path(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    pub fn size(&self, text: &str) -> String {
        self.paint(MAGENTA, text)
    }

    pub fn perm(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    pub fn symlink(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    pub fn warn(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    /// Executable markers and matching diff lines share the same green.
    pub fn good(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }
}
