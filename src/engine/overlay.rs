use crate::engine::state::ArState;

/// What the UI layer shows on top of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayView {
    Hidden,
    UnsupportedBanner,
    StartButton,
    TapToPlaceHint,
}

impl OverlayView {
    pub fn text(&self) -> Option<&'static str> {
        match self {
            OverlayView::Hidden => None,
            OverlayView::UnsupportedBanner => Some("AR is not supported on this device"),
            OverlayView::StartButton => Some("Start AR"),
            OverlayView::TapToPlaceHint => Some("Tap to place"),
        }
    }

    #[cfg(test)]
    pub fn shows_start_button(&self) -> bool {
        matches!(self, OverlayView::StartButton)
    }

    #[cfg(test)]
    pub fn shows_unsupported_banner(&self) -> bool {
        matches!(self, OverlayView::UnsupportedBanner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    pub show_hint: bool,
}

impl Overlay {
    pub fn new(show_hint: bool) -> Self {
        Self { show_hint }
    }

    pub fn view(&self, state: &ArState) -> OverlayView {
        match state {
            ArState::Probing => OverlayView::Hidden,
            ArState::Unsupported => OverlayView::UnsupportedBanner,
            ArState::Inactive => OverlayView::StartButton,
            ArState::Active { .. } if state.is_placed() => OverlayView::Hidden,
            ArState::Active { .. } if self.show_hint => OverlayView::TapToPlaceHint,
            ArState::Active { .. } => OverlayView::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::Placement;
    use crate::engine::xr::SessionId;

    #[test]
    fn unsupported_shows_banner_without_button() {
        let view = Overlay::new(true).view(&ArState::Unsupported);
        assert!(view.shows_unsupported_banner());
        assert!(!view.shows_start_button());
    }

    #[test]
    fn hint_follows_variant() {
        let active = ArState::Active {
            session: SessionId::new(),
            placement: Placement::NotPlaced,
        };
        assert_eq!(Overlay::new(true).view(&active), OverlayView::TapToPlaceHint);
        assert_eq!(Overlay::new(false).view(&active), OverlayView::Hidden);
        assert!(!Overlay::new(true).view(&active).shows_start_button());
    }

    #[test]
    fn probing_shows_nothing() {
        assert_eq!(Overlay::new(true).view(&ArState::Probing), OverlayView::Hidden);
        assert_eq!(OverlayView::Hidden.text(), None);
        assert_eq!(OverlayView::StartButton.text(), Some("Start AR"));
    }
}
