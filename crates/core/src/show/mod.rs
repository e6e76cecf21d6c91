//! Top-level frame driver tying the timeline to the scene and collaborators.

use crate::{
    assets::{AssetStore, TextureLoader},
    audio::{AudioBackend, Cue, SoundBank},
    config::AppConfig,
    effect::{EffectKind, Outcome, Stage},
    input::{Action, InputState},
    render::{self, Canvas},
    scene::{Layout, Palette, Scene},
    script::{self, Tempo},
    timeline::Timeline,
    Result,
};

#[derive(Debug)]
pub struct Show {
    scene: Scene,
    timeline: Timeline,
    sounds: SoundBank,
    assets: AssetStore,
    choose_index: usize,
    started: bool,
}

impl Show {
    /// Builds the authored show. Missing assets are logged, not fatal.
    pub fn new(
        config: &AppConfig,
        textures: &mut dyn TextureLoader,
        audio: Box<dyn AudioBackend>,
    ) -> Result<Self> {
        config.validate()?;
        let script = script::build(&config.show, Tempo::new(config.audio.bpm));
        let mut scene = Scene::new(
            Layout::from_display(&config.display),
            script.start,
            Palette::default(),
        );
        scene.tracked_key = script.tracked_key;
        let timeline = Timeline::new(script.effects).with_lead_in(config.show.lead_in);
        tracing::info!(
            effects = timeline.len(),
            total_seconds = timeline.total_duration(),
            start = %script.start,
            "show built"
        );

        Ok(Self::from_parts(
            scene,
            timeline,
            SoundBank::load(audio, &config.audio),
            AssetStore::load(textures, &config.assets),
            script.choose_index,
        ))
    }

    pub fn from_parts(
        scene: Scene,
        timeline: Timeline,
        sounds: SoundBank,
        assets: AssetStore,
        choose_index: usize,
    ) -> Self {
        Self {
            scene,
            timeline,
            sounds,
            assets,
            choose_index,
            started: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn choose_index(&self) -> usize {
        self.choose_index
    }

    /// Result of the pick, once the reveal is on screen.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.timeline.current()?.kind() {
            EffectKind::End(end) => Some(end.outcome()),
            _ => None,
        }
    }

    /// Runs one frame: device input, effect update, base pass, overlay pass.
    /// Returns `false` once the host should shut down.
    pub fn frame(&mut self, dt: f32, input: &InputState, canvas: &mut dyn Canvas) -> bool {
        if input.is_just_pressed(Action::Quit) {
            tracing::info!("quit requested");
            self.sounds.stop(Cue::Music);
            return false;
        }
        if !self.started {
            self.sounds.play(Cue::Music);
            self.started = true;
        }
        if input.is_just_pressed(Action::ToggleHitboxes) {
            let globals = &mut self.scene.globals;
            globals.show_hitboxes = !globals.show_hitboxes;
        }

        let skipping = input.is_just_pressed(Action::Skip)
            && self
                .timeline
                .current_index()
                .map_or(true, |index| index < self.choose_index);

        canvas.begin_frame();
        let mut stage = Stage {
            scene: &mut self.scene,
            input,
            sounds: &mut self.sounds,
            canvas,
        };
        if skipping {
            tracing::info!(target_index = self.choose_index, "skipping to the pick");
            self.timeline.skip_to(&mut stage, self.choose_index);
            stage.sounds.seek_seconds(Cue::Music, self.timeline.elapsed());
        }

        self.timeline.anim(&mut stage, dt);
        stage.scene.update_shake(dt);
        render::draw_scene(stage.scene, &self.assets, &mut *stage.canvas);
        self.timeline.late_anim(&mut stage, dt);
        stage.canvas.end_frame();
        true
    }
}
