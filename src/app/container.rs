use std::sync::Arc;

use crate::adapters::{FfmpegAdapter, RenderConfig, SessionBus};
use crate::app::render_interactor::{JobSettings, RenderInteractor};
use crate::engine::executor::RenderExecutor;
use crate::engine::filter_graph::FilterGraphCompiler;
use crate::engine::hardware::HardwareDetector;
use crate::error::RenderResult;
use crate::ports::{EnginePort, ProgressSink};

pub trait AppContainer: Send + Sync {
    fn render_interactor(&self) -> Arc<RenderInteractor>;
    fn hardware_detector(&self) -> Arc<HardwareDetector>;
    fn session_bus(&self) -> Arc<SessionBus>;
}

pub struct DefaultAppContainer {
    render_interactor: Arc<RenderInteractor>,
    hardware_detector: Arc<HardwareDetector>,
    session_bus: Arc<SessionBus>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg adapter configured in `config`
    pub fn new(config: &RenderConfig) -> RenderResult<Self> {
        let engine = Arc::new(FfmpegAdapter::new(&config.engine.ffmpeg_path));
        Self::with_engine(config, engine)
    }

    /// Wire against an arbitrary engine
    pub fn with_engine(config: &RenderConfig, engine: Arc<dyn EnginePort>) -> RenderResult<Self> {
        config.validate()?;

        let hardware_detector = Arc::new(HardwareDetector::with_timeout(
            Arc::clone(&engine),
            config.detection_timeout(),
        ));
        let session_bus = Arc::new(SessionBus::default());

        let compiler = FilterGraphCompiler::new(&config.render.font_file)
            .with_badge_size(config.render.badge_size)
            .with_inline_limit(config.render.inline_filter_limit);
        let executor = Arc::new(RenderExecutor::new(
            engine,
            compiler,
            config.execution_policy()?,
        ));

        let settings = JobSettings {
            output_dir: config.output.output_dir.clone(),
            scratch_dir: config.output.scratch_dir.clone(),
            public_base_url: config.output.public_base_url.clone(),
            badge_size: config.render.badge_size,
            progress_throttle: config.progress_throttle(),
        };
        let render_interactor = Arc::new(RenderInteractor::new(
            Arc::clone(&hardware_detector),
            executor,
            Arc::clone(&session_bus) as Arc<dyn ProgressSink>,
            config.render.max_concurrent_jobs,
            settings,
        ));

        Ok(Self {
            render_interactor,
            hardware_detector,
            session_bus,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn render_interactor(&self) -> Arc<RenderInteractor> {
        Arc::clone(&self.render_interactor)
    }

    fn hardware_detector(&self) -> Arc<HardwareDetector> {
        Arc::clone(&self.hardware_detector)
    }

    fn session_bus(&self) -> Arc<SessionBus> {
        Arc::clone(&self.session_bus)
    }
}
