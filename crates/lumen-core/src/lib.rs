//! Data model, color/math primitives, and the output seam for the
//! music-reactive lighting control core.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod ids;
pub mod intent;
pub mod telemetry;
pub mod traits;

pub use color::{clampf, lerp};
pub use config::EngineConfig;
pub use error::{EngineError, SetOutcome, SetResult};
pub use frame::AudioFrame;
pub use intent::{BrightnessTier, ExternalIntent, HueIntent, HueState, RgbColor, WizIntent};
pub use telemetry::Telemetry;
pub use traits::{Emitter, RecordingEmitter};
