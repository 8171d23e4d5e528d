//! Session store tying the pipeline together.
//!
//! A [`Session`] owns every piece of mutable state of one customization
//! session and exposes one method per user event: loading a model, uploading
//! a logo, placing or clearing a zone and baking. State changes are always a
//! single replace on the affected field.
//!
//! Model loads are keyed with monotonically increasing [`LoadTicket`]s. A load
//! that completes after a newer one was requested is discarded, so the most
//! recently *requested* model wins even if loads finish out of order.
//!
//! # Example
//!
//! ```
//! use livery::config::Config;
//! use livery::scene::Scene;
//! use livery::session::{LoadOutcome, Session};
//!
//! let mut session = Session::new(Config::default()).unwrap();
//!
//! let stale = session.begin_load();
//! let fresh = session.begin_load();
//! assert_eq!(session.finish_load(fresh, Ok(Scene::placeholder())), LoadOutcome::Applied);
//! assert_eq!(session.finish_load(stale, Ok(Scene::default())), LoadOutcome::Stale);
//! ```

use std::path::Path;

use log::{error, info, warn};

use crate::bake::{bake_with_progress, BakedTexture, Progress};
use crate::config::Config;
use crate::editor::{Editor, EditorState, LogoElement, LogoId};
use crate::error::Result;
use crate::io;
use crate::scene::{apply_baked_texture, Scene};
use crate::uv::{extract_uv_image, UvImage};
use crate::zone::ZoneRegistry;

/// Token identifying one model load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// What happened to a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The loaded scene was installed.
    Applied,
    /// Loading failed; the placeholder scene was installed.
    Fallback,
    /// A newer load was requested meanwhile; the result was dropped.
    Stale,
}

/// The model currently shown.
#[derive(Debug, Clone)]
pub enum SceneState {
    /// Nothing loaded yet.
    Empty,
    /// A model loaded successfully.
    Loaded(Scene),
    /// Loading failed; the placeholder shape is shown instead.
    Fallback {
        /// The placeholder scene.
        scene: Scene,
        /// Why the load failed.
        reason: String,
    },
}

impl SceneState {
    /// The displayed scene, if any.
    pub fn scene(&self) -> Option<&Scene> {
        match self {
            SceneState::Empty => None,
            SceneState::Loaded(scene) | SceneState::Fallback { scene, .. } => Some(scene),
        }
    }
}

/// All state of one customization session.
#[derive(Debug)]
pub struct Session {
    config: Config,
    registry: ZoneRegistry,
    scene: SceneState,
    uv_image: Option<UvImage>,
    editor: Editor,
    baked: Option<BakedTexture>,
    next_ticket: u64,
    finished_ticket: u64,
}

impl Session {
    /// Start a session on the configured default model.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let registry = config.registry()?;
        let zones = registry.zones(&config.default_model)?.to_vec();
        let editor = Editor::new(config.default_model.clone(), zones, config.editor.clone());

        Ok(Self {
            config,
            registry,
            scene: SceneState::Empty,
            uv_image: None,
            editor,
            baked: None,
            next_ticket: 0,
            finished_ticket: 0,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The zone registry.
    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// The displayed model.
    pub fn scene_state(&self) -> &SceneState {
        &self.scene
    }

    /// The displayed scene, if any.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.scene()
    }

    /// The current UV image.
    pub fn uv_image(&self) -> Option<&UvImage> {
        self.uv_image.as_ref()
    }

    /// The placement editor.
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Serializable editor state.
    pub fn state(&self) -> &EditorState {
        self.editor.state()
    }

    /// Logo elements on the canvas.
    pub fn elements(&self) -> Vec<LogoElement> {
        self.editor.elements()
    }

    /// The most recent bake.
    pub fn baked(&self) -> Option<&BakedTexture> {
        self.baked.as_ref()
    }

    /// Switch to another model's zone table.
    ///
    /// Placements belong to zones, so they are discarded. The current upload
    /// is carried over.
    pub fn select_model(&mut self, model_id: &str) -> Result<()> {
        let zones = self.registry.zones(model_id)?.to_vec();
        let mut editor = Editor::new(model_id, zones, self.config.editor.clone());
        if let Some(uploaded) = self.editor.uploaded_logo() {
            if let Some(image) = self.editor.logo(uploaded.logo_id) {
                editor.upload_logo_image(&uploaded.file_name, (**image).clone());
            }
        }
        self.editor = editor;
        info!("selected model {}", model_id);
        Ok(())
    }

    /// Register a new load request.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        LoadTicket(self.next_ticket)
    }

    /// Whether a ticket belongs to the most recent load request.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.next_ticket
    }

    /// Complete a load request.
    ///
    /// Results of stale tickets are discarded, and so is a second completion
    /// of a ticket that already finished. A failed load installs the
    /// placeholder scene. Either way the UV image is regenerated.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Scene>) -> LoadOutcome {
        if !self.is_current(ticket) {
            warn!("discarding stale model load {:?}", ticket);
            return LoadOutcome::Stale;
        }
        if ticket.0 == self.finished_ticket {
            warn!("discarding repeated completion of model load {:?}", ticket);
            return LoadOutcome::Stale;
        }
        self.finished_ticket = ticket.0;

        let outcome = match result {
            Ok(scene) => {
                info!(
                    "loaded model: {} meshes, {} materials",
                    scene.num_meshes(),
                    scene.num_materials()
                );
                self.scene = SceneState::Loaded(scene);
                LoadOutcome::Applied
            }
            Err(e) => {
                error!("model loading error: {}", e);
                self.scene = SceneState::Fallback {
                    scene: Scene::placeholder(),
                    reason: e.to_string(),
                };
                LoadOutcome::Fallback
            }
        };

        self.uv_image = self
            .scene
            .scene()
            .map(|scene| extract_uv_image(scene, &self.config.uv));
        outcome
    }

    /// Load a model file synchronously.
    pub fn load_model<P: AsRef<Path>>(&mut self, path: P) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = io::load(path);
        self.finish_load(ticket, result)
    }

    /// Load an uploaded model synchronously.
    pub fn load_model_bytes(&mut self, bytes: &[u8]) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = io::load_slice(bytes);
        self.finish_load(ticket, result)
    }

    /// Upload a logo file.
    ///
    /// Decode failures are logged and skipped, keeping the previous upload.
    pub fn upload_logo(&mut self, file_name: &str, bytes: &[u8]) -> Option<LogoId> {
        match self.editor.upload_logo(file_name, bytes) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Place the current upload into a zone.
    pub fn place_logo(&mut self, zone_id: &str) -> Result<()> {
        self.editor.place_logo(zone_id)
    }

    /// Clear a zone. Returns whether a placement was removed.
    pub fn clear_zone(&mut self, zone_id: &str) -> bool {
        self.editor.clear_zone(zone_id)
    }

    /// Bake the current state and apply it to every material of a loaded scene.
    ///
    /// The placeholder shown after a failed load keeps its own tint.
    pub fn bake(&mut self) -> &BakedTexture {
        self.bake_with_progress(&Progress::none())
    }

    /// Bake with progress reporting.
    pub fn bake_with_progress(&mut self, progress: &Progress) -> &BakedTexture {
        let base = self.uv_image.as_ref().map(|uv| uv.image.as_ref());
        let baked = bake_with_progress(base, &self.editor, &self.config.bake, progress);

        let updated = match &mut self.scene {
            SceneState::Loaded(scene) => apply_baked_texture(scene, &baked),
            SceneState::Empty | SceneState::Fallback { .. } => 0,
        };
        info!(
            "texture baked ({}px, {} logo(s)), applied to {} material(s)",
            baked.resolution(),
            self.editor.state().placements.len(),
            updated
        );

        self.baked.insert(baked)
    }
}
