//! Formscope: extract title, description, question count and submit URL
//! from public Google Forms and SurveyMonkey pages.
//!
//! Markup is acquired with a static GET first and a headless-browser render
//! only when the static page lacks the platform's form data.

pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod model;
pub mod platform;
pub mod renderer;

pub use config::ExtractorConfig;
pub use detect::detect;
pub use engine::{extract_form_info, FormExtractor};
pub use error::{ErrorKind, ExtractError, ExtractResult};
pub use fetch::{ContentFetcher, FetchMode, FetchResult, PageFetcher};
pub use model::{ExtractResponse, FormDetails, FormInfo, Platform};
pub use platform::FormPlatform;
pub use renderer::{NoopRenderer, Renderer};
