//! Serialisable bindings from controller actions to physical inputs.
//!
//! Keys serialise by their winit variant name (`"KeyE"`, `"ShiftLeft"`), so a
//! RON config reads `pick: Key("KeyE")` or `throw: Mouse(Left)`.

use serde::{Deserialize, Serialize};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Serde helper for [`KeyCode`], which has no serde support without winit's feature flag.
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    pub fn serialize<S: Serializer>(code: &KeyCode, s: S) -> Result<S::Ok, S::Error> {
        format!("{code:?}").serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<KeyCode, D::Error> {
        let name = String::deserialize(d)?;
        super::keycode_from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
    }
}

/// Parses a winit [`KeyCode`] variant name.
#[must_use]
pub fn keycode_from_name(name: &str) -> Option<KeyCode> {
    Some(match name {
        "KeyA" => KeyCode::KeyA,
        "KeyB" => KeyCode::KeyB,
        "KeyC" => KeyCode::KeyC,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyF" => KeyCode::KeyF,
        "KeyG" => KeyCode::KeyG,
        "KeyH" => KeyCode::KeyH,
        "KeyI" => KeyCode::KeyI,
        "KeyJ" => KeyCode::KeyJ,
        "KeyK" => KeyCode::KeyK,
        "KeyL" => KeyCode::KeyL,
        "KeyM" => KeyCode::KeyM,
        "KeyN" => KeyCode::KeyN,
        "KeyO" => KeyCode::KeyO,
        "KeyP" => KeyCode::KeyP,
        "KeyQ" => KeyCode::KeyQ,
        "KeyR" => KeyCode::KeyR,
        "KeyS" => KeyCode::KeyS,
        "KeyT" => KeyCode::KeyT,
        "KeyU" => KeyCode::KeyU,
        "KeyV" => KeyCode::KeyV,
        "KeyW" => KeyCode::KeyW,
        "KeyX" => KeyCode::KeyX,
        "KeyY" => KeyCode::KeyY,
        "KeyZ" => KeyCode::KeyZ,
        "Digit0" => KeyCode::Digit0,
        "Digit1" => KeyCode::Digit1,
        "Digit2" => KeyCode::Digit2,
        "Digit3" => KeyCode::Digit3,
        "Digit4" => KeyCode::Digit4,
        "Digit5" => KeyCode::Digit5,
        "Digit6" => KeyCode::Digit6,
        "Digit7" => KeyCode::Digit7,
        "Digit8" => KeyCode::Digit8,
        "Digit9" => KeyCode::Digit9,
        "Space" => KeyCode::Space,
        "Enter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "Backquote" => KeyCode::Backquote,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "ControlRight" => KeyCode::ControlRight,
        "AltLeft" => KeyCode::AltLeft,
        "AltRight" => KeyCode::AltRight,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        _ => return None,
    })
}

/// Mouse buttons that can be bound. Mirrors the winit buttons a controller uses.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MouseButtonBinding {
    /// Primary button ("Mouse0").
    Left,
    /// Secondary button ("Mouse1").
    Right,
    /// Wheel button ("Mouse2").
    Middle,
}

impl MouseButtonBinding {
    /// Convert to the winit [`MouseButton`] type.
    #[must_use]
    pub fn to_winit(self) -> MouseButton {
        match self {
            Self::Left => MouseButton::Left,
            Self::Right => MouseButton::Right,
            Self::Middle => MouseButton::Middle,
        }
    }
}

/// One physical input bound to a controller action.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Binding {
    /// A keyboard key by physical scan code.
    Key(#[serde(with = "keycode_serde")] KeyCode),
    /// A mouse button.
    Mouse(MouseButtonBinding),
}

impl From<KeyCode> for Binding {
    fn from(code: KeyCode) -> Self {
        Self::Key(code)
    }
}

impl From<MouseButtonBinding> for Binding {
    fn from(button: MouseButtonBinding) -> Self {
        Self::Mouse(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_binding_ron_uses_variant_name() {
        let s = ron::to_string(&Binding::Key(KeyCode::KeyE)).unwrap();
        assert_eq!(s, "Key(\"KeyE\")");
        let back: Binding = ron::from_str(&s).unwrap();
        assert_eq!(back, Binding::Key(KeyCode::KeyE));
    }

    #[test]
    fn test_mouse_binding_parses() {
        let b: Binding = ron::from_str("Mouse(Left)").unwrap();
        assert_eq!(b, Binding::Mouse(MouseButtonBinding::Left));
        assert_eq!(MouseButtonBinding::Left.to_winit(), MouseButton::Left);
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let r: Result<Binding, _> = ron::from_str("Key(\"KeyNope\")");
        assert!(r.is_err());
    }

    #[test]
    fn test_every_named_key_roundtrips_through_debug() {
        for name in ["KeyQ", "Escape", "ShiftLeft", "ArrowLeft", "Digit7"] {
            let code = keycode_from_name(name).unwrap();
            assert_eq!(format!("{code:?}"), name);
        }
    }
}
