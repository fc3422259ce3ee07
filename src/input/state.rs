//! Input state carried alongside samples

use super::events::PointerKind;

/// Keyboard modifiers held while a sample was produced
///
/// Copied verbatim from the originating sample into every synthetic event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifier held
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Returns true if any modifier is held
    pub fn any(self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// What kind of device the user most recently interacted with
///
/// Hosts use this to switch hover-dependent UI on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputModality {
    #[default]
    Unknown,
    Mouse,
    Touch,
}

impl InputModality {
    /// Advance the modality given a platform sample of `kind`
    pub fn observe(self, kind: PointerKind) -> Self {
        match kind {
            PointerKind::Mouse => Self::Mouse,
            PointerKind::Touch | PointerKind::Pen => Self::Touch,
        }
    }

    /// Returns true while touch (or pen) input is in use
    pub fn is_touch(self) -> bool {
        matches!(self, Self::Touch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_any() {
        assert!(!Modifiers::NONE.any());
        assert!(
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            }
            .any()
        );
    }

    #[test]
    fn test_modality_follows_last_device() {
        let modality = InputModality::default();
        assert!(!modality.is_touch());

        let modality = modality.observe(PointerKind::Pen);
        assert!(modality.is_touch());

        let modality = modality.observe(PointerKind::Mouse);
        assert_eq!(modality, InputModality::Mouse);
    }
}
