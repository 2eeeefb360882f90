/// AI pipeline for music video frames
///
/// Turns a base prompt, an art style and a segment plan into one generated
/// image per segment, calling an image backend strictly in sequence.

pub mod backends;
pub mod payload;
pub mod pipeline;
pub mod prompt;
pub mod styles;

pub use backends::{
    BackendConfig, BackendError, BackendFactory, BackendType, ImageBackend, ImagenBackend,
    MockBackend, MockConfig,
};
pub use payload::{decode_data_url, ImagePayload};
pub use pipeline::{GenerationPipeline, GenerationProgress, PipelineError};
pub use prompt::build_scene_prompt;
pub use styles::{default_style, find_style, ArtStyle, ART_STYLES};
