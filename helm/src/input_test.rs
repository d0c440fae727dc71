use super::*;

// =============================================================
// Key
// =============================================================

#[test]
fn key_single_char_normalizes_to_lowercase() {
    assert_eq!(Key::new("W").normalized(), Key::new("w"));
    assert_eq!(Key::new("w").normalized(), Key::new("w"));
}

#[test]
fn key_named_keys_keep_case() {
    assert_eq!(Key::new("PageUp").normalized(), Key::new("PageUp"));
}

#[test]
fn key_escape_aliases() {
    assert!(Key::new("Escape").is_escape());
    assert!(Key::new("Esc").is_escape());
    assert!(!Key::new("e").is_escape());
}

#[test]
fn key_control_detection() {
    assert!(Key::new("Control").is_control());
    assert!(!Key::new("c").is_control());
}

// =============================================================
// HeldKeys
// =============================================================

#[test]
fn held_keys_press_and_release() {
    let mut held = HeldKeys::default();
    assert!(held.press(&Key::new("w")));
    assert!(!held.press(&Key::new("W")));
    assert!(held.is_held(&Key::new("w")));
    assert!(held.release(&Key::new("W")));
    assert!(!held.is_held(&Key::new("w")));
    assert!(!held.release(&Key::new("w")));
}

#[test]
fn held_keys_clear() {
    let mut held = HeldKeys::default();
    held.press(&Key::new("a"));
    held.press(&Key::new("d"));
    held.clear();
    assert!(held.is_empty());
}

#[test]
fn held_keys_active_ops_combine() {
    let mut held = HeldKeys::default();
    held.press(&Key::new("w"));
    held.press(&Key::new("d"));
    held.press(&Key::new("z"));
    let ops = held.active_ops(&KeyBindings::default());
    assert_eq!(ops.len(), 2);
    assert!(ops.contains(&CameraOp::Forward));
    assert!(ops.contains(&CameraOp::StrafeRight));
}

// =============================================================
// KeyBindings
// =============================================================

#[test]
fn default_bindings_cover_movement_keys() {
    let b = KeyBindings::default();
    assert_eq!(b.op_for(&Key::new("w")), Some(CameraOp::Forward));
    assert_eq!(b.op_for(&Key::new("S")), Some(CameraOp::Back));
    assert_eq!(b.op_for(&Key::new("q")), Some(CameraOp::YawLeft));
    assert_eq!(b.op_for(&Key::new("PageDown")), Some(CameraOp::Sink));
    assert_eq!(b.op_for(&Key::new("ArrowLeft")), Some(CameraOp::PanWest));
    assert_eq!(b.op_for(&Key::new("x")), None);
}

#[test]
fn custom_bindings_replace_defaults() {
    let mut map = HashMap::new();
    map.insert("i".to_owned(), CameraOp::Forward);
    let b = KeyBindings(map);
    assert_eq!(b.op_for(&Key::new("i")), Some(CameraOp::Forward));
    assert_eq!(b.op_for(&Key::new("w")), None);
}

// =============================================================
// Modifiers / Button / Surface
// =============================================================

#[test]
fn modifiers_default_is_empty() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
}

#[test]
fn button_default_is_primary() {
    assert_eq!(Button::default(), Button::Primary);
}

#[test]
fn surface_default_is_scene() {
    assert_eq!(Surface::default(), Surface::Scene);
}
