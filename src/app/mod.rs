// Application layer - Use case interactors

pub mod container;
pub mod render_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use render_interactor::{JobSettings, RenderInteractor};
