#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

#[derive(Default)]
pub struct Scroll {
    list_length: u16,
    viewport_length: u16,
    pub position: u16,
}

impl Scroll {
    fn max_position(&self) -> u16 {
        return self.list_length.saturating_sub(self.viewport_length);
    }

    pub fn up(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    pub fn up_page(&mut self) {
        for _ in 0..10 {
            self.up();
        }
    }

    pub fn down(&mut self) {
        self.position = self.position.saturating_add(1).min(self.max_position());
    }

    pub fn down_page(&mut self) {
        for _ in 0..10 {
            self.down();
        }
    }

    pub fn last(&mut self) {
        self.position = self.max_position();
    }

    /// Moves the viewport down by `lines` so the same content stays in view
    /// after lines were inserted above it.
    pub fn shift(&mut self, lines: u16) {
        self.position = self.position.saturating_add(lines).min(self.max_position());
    }

    pub fn set_state(&mut self, list_length: u16, viewport_length: u16) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;
        self.position = self.position.min(self.max_position());
    }
}
