//! Layered Compositor
//!
//! Manages z-ordered, full-screen layers. Each layer has its own buffer and
//! is redrawn independently; the compositor stacks the visible ones into a
//! final output buffer, back to front.
//!
//! Untouched cells are transparent, so the floating hearts on the backdrop
//! show through everywhere the stage did not paint. A styled space counts as
//! painted: the gaps between words of a line stay clear of hearts.

use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;

/// The fixed set of layers, back to front
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Floating hearts
    Backdrop,
    /// Sprite, bubbles, cards and buttons
    Stage,
    /// Confetti
    Effects,
    /// Key hints
    Status,
}

impl LayerKind {
    /// Every layer
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Backdrop,
        LayerKind::Stage,
        LayerKind::Effects,
        LayerKind::Status,
    ];

    /// Stacking order; higher draws on top
    pub fn z_index(self) -> i32 {
        match self {
            LayerKind::Backdrop => 0,
            LayerKind::Stage => 10,
            LayerKind::Effects => 50,
            LayerKind::Status => 60,
        }
    }
}

/// One layer's buffer and visibility
#[derive(Debug)]
struct Layer {
    kind: LayerKind,
    buffer: Buffer,
    visible: bool,
}

/// The compositor manages all layers and composites them together
pub struct Compositor {
    /// Layers sorted by z-index
    layers: Vec<Layer>,
    /// Output buffer (composited result)
    output: Buffer,
    /// Total area
    area: Rect,
}

impl Compositor {
    /// Create a compositor with every layer covering `area`
    pub fn new(area: Rect) -> Self {
        let mut layers: Vec<Layer> = LayerKind::ALL
            .iter()
            .map(|&kind| Layer {
                kind,
                buffer: Buffer::empty(area),
                visible: true,
            })
            .collect();
        layers.sort_by_key(|l| l.kind.z_index());

        Self {
            layers,
            output: Buffer::empty(area),
            area,
        }
    }

    /// Screen area
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Get mutable access to a layer's buffer for rendering
    pub fn layer_buffer_mut(&mut self, kind: LayerKind) -> &mut Buffer {
        let index = self.index_of(kind);
        &mut self.layers[index].buffer
    }

    /// Set layer visibility
    pub fn set_visible(&mut self, kind: LayerKind, visible: bool) {
        let index = self.index_of(kind);
        self.layers[index].visible = visible;
    }

    /// Whether a layer is drawn
    pub fn is_visible(&self, kind: LayerKind) -> bool {
        self.layers[self.index_of(kind)].visible
    }

    /// Resize the compositor and every layer
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.output = Buffer::empty(area);
        for layer in &mut self.layers {
            layer.buffer = Buffer::empty(area);
        }
    }

    /// Composite all visible layers into the output buffer
    pub fn composite(&mut self) -> &Buffer {
        self.output.reset();

        for layer in &self.layers {
            if layer.visible {
                Self::blit_layer(&mut self.output, &layer.buffer);
            }
        }

        &self.output
    }

    /// Copy every painted cell of `source` onto `output`
    fn blit_layer(output: &mut Buffer, source: &Buffer) {
        let blank = Cell::default();
        let area = output.area.intersection(source.area);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                let cell = &source[(x, y)];
                if *cell != blank {
                    output[(x, y)] = cell.clone();
                }
            }
        }
    }

    fn index_of(&self, kind: LayerKind) -> usize {
        // Layers are built from LayerKind::ALL, so every kind is present
        self.layers
            .iter()
            .position(|l| l.kind == kind)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::style::{Color, Style};

    #[test]
    fn test_higher_layer_wins() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 10, 2));
        compositor
            .layer_buffer_mut(LayerKind::Backdrop)
            .set_string(0, 0, "hhhh", Style::default());
        compositor
            .layer_buffer_mut(LayerKind::Effects)
            .set_string(1, 0, "*", Style::default());

        let out = compositor.composite();
        assert_eq!(out[(0, 0)].symbol(), "h");
        assert_eq!(out[(1, 0)].symbol(), "*");
        assert_eq!(out[(2, 0)].symbol(), "h");
    }

    #[test]
    fn test_background_is_opaque() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 4, 1));
        compositor
            .layer_buffer_mut(LayerKind::Backdrop)
            .set_string(0, 0, "♥", Style::default());
        compositor
            .layer_buffer_mut(LayerKind::Stage)
            .set_style(Rect::new(0, 0, 2, 1), Style::default().bg(Color::Black));

        let out = compositor.composite();
        assert_eq!(out[(0, 0)].symbol(), " ");
        assert_eq!(out[(0, 0)].bg, Color::Black);
    }

    #[test]
    fn test_styled_space_hides_backdrop() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 4, 1));
        compositor
            .layer_buffer_mut(LayerKind::Backdrop)
            .set_string(0, 0, "♥♥♥", Style::default());
        compositor
            .layer_buffer_mut(LayerKind::Stage)
            .set_string(0, 0, "a b", Style::default().fg(Color::White));

        let out = compositor.composite();
        assert_eq!(out[(1, 0)].symbol(), " ");
        assert_eq!(out[(3, 0)].symbol(), " ");
    }

    #[test]
    fn test_hidden_layer_is_skipped() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 4, 1));
        compositor
            .layer_buffer_mut(LayerKind::Status)
            .set_string(0, 0, "esc", Style::default());
        compositor.set_visible(LayerKind::Status, false);

        assert!(!compositor.is_visible(LayerKind::Status));
        assert_eq!(compositor.composite()[(0, 0)].symbol(), " ");
    }

    #[test]
    fn test_resize_resets_layers() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 4, 1));
        compositor.resize(Rect::new(0, 0, 8, 3));
        assert_eq!(compositor.area(), Rect::new(0, 0, 8, 3));
        assert_eq!(
            compositor.layer_buffer_mut(LayerKind::Stage).area,
            Rect::new(0, 0, 8, 3)
        );
    }
}
