//! Client core for the naval strategy game.
//!
//! This crate is compiled to WebAssembly and runs in the browser next to the
//! 3D scene. It owns the smoothed camera, the rotating minimap, and the
//! gesture state machine that turns pointer and keyboard input into ship
//! commands. The host JavaScript layer wires DOM events to the engine, hands
//! the sampled [`camera::CameraPose`] to its renderer each frame, and
//! forwards the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`camera`] | Eased camera, poses, and ground picking |
//! | [`minimap`] | World/pixel projection, island cache, pointer inversion |
//! | [`actions`] | Ship selection, movement, and shooting gestures |
//! | [`motion`] | Time-based interpolation between two values |
//! | [`scale`] | One-dimensional affine maps |
//! | [`input`] | Input event types, held keys, and key bindings |
//! | [`sim`] | The simulation interface and its snapshot types |
//! | [`leaderboard`] | Player standings and compass label |
//! | [`render`] | Minimap and leaderboard painting |
//! | [`clock`] | Time sources |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants (height limits, pixel margins, etc.) |

pub mod actions;
pub mod camera;
pub mod clock;
pub mod consts;
pub mod engine;
pub mod error;
pub mod input;
pub mod leaderboard;
pub mod minimap;
pub mod motion;
pub mod render;
pub mod scale;
pub mod sim;
