use sakura_engine::{FieldConfig, InstanceBuffer, ParticleField, Surface};

/// Wires a petal field to a drawing surface and drives it frame by frame.
///
/// The bridge keeps one `thread_local!` runner over the DOM surface; tests run
/// the same runner over an in-memory surface.
pub struct PetalRunner<S: Surface> {
    field: ParticleField,
    surface: S,
    /// One attached element per field slot while running, empty otherwise.
    handles: Vec<S::Handle>,
    instances: InstanceBuffer,
    running: bool,
    frames: u64,
}

impl<S: Surface> PetalRunner<S> {
    pub fn new(config: FieldConfig, surface: S) -> Self {
        let field = ParticleField::new(config, surface.viewport());
        let mut instances = InstanceBuffer::with_capacity(field.len());
        field.write_instances(&mut instances);

        Self {
            handles: Vec::with_capacity(field.len()),
            field,
            surface,
            instances,
            running: false,
            frames: 0,
        }
    }

    /// Attach one element per petal. Calling again while running does nothing.
    pub fn start(&mut self) -> Result<(), S::Error> {
        if self.running {
            return Ok(());
        }
        self.field.set_viewport(self.surface.viewport());
        self.field.write_instances(&mut self.instances);
        let mut failed = None;
        for petal in &self.instances.instances {
            match self.surface.attach(petal) {
                Ok(handle) => self.handles.push(handle),
                Err(err) => {
                    failed = Some(err);
                    break;
                }
            }
        }
        if let Some(err) = failed {
            // Leave nothing half-attached so a retry starts clean.
            let _ = self.detach_all();
            return Err(err);
        }
        self.running = true;
        log::info!("sakura: started with {} petals", self.handles.len());
        Ok(())
    }

    /// Run one animation frame: tick the field, swap elements for recycled
    /// petals, redraw everything.
    pub fn frame(&mut self) -> Result<(), S::Error> {
        if !self.running {
            return Ok(());
        }
        self.field.set_viewport(self.surface.viewport());
        self.field.tick();
        self.field.write_instances(&mut self.instances);
        self.reattach_recycled()?;

        for (handle, petal) in self.handles.iter().zip(&self.instances.instances) {
            self.surface.draw(handle, petal)?;
        }
        self.frames += 1;
        Ok(())
    }

    /// Re-read the viewport and recycle petals that are now out of bounds.
    pub fn resize(&mut self) -> Result<(), S::Error> {
        let viewport = self.surface.viewport();
        self.field.resize(viewport);
        self.field.write_instances(&mut self.instances);
        if self.running {
            self.reattach_recycled()?;
        }
        Ok(())
    }

    /// Detach every element. The field keeps its state for a later `start`.
    pub fn stop(&mut self) -> Result<(), S::Error> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        let result = self.detach_all();
        log::info!("sakura: stopped after {} frames", self.frames);
        result
    }

    /// Detach every handle, even past a failure. Returns the first error.
    fn detach_all(&mut self) -> Result<(), S::Error> {
        let mut first_err = None;
        for handle in self.handles.drain(..) {
            if let Err(err) = self.surface.detach(handle) {
                log::warn!("sakura: failed to detach a petal");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Give every slot recycled by the last tick/resize a fresh element.
    fn reattach_recycled(&mut self) -> Result<(), S::Error> {
        for &slot in self.field.recycled() {
            let Some(petal) = self.instances.get(slot) else {
                continue;
            };
            let fresh = self.surface.attach(petal)?;
            let old = std::mem::replace(&mut self.handles[slot], fresh);
            self.surface.detach(old)?;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // ---- Pointer accessors for direct memory reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.instance_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sakura_engine::{Particle, PetalInstance, Viewport};
    use glam::Vec2;
    use std::collections::HashMap;

    /// In-memory surface that tracks live elements by id.
    #[derive(Default)]
    struct RecordingSurface {
        viewport: Viewport,
        next_id: u32,
        live: HashMap<u32, PetalInstance>,
        attached: usize,
        detached: usize,
        draws: usize,
        fail_attach: bool,
        /// Fail every attach once this many have succeeded.
        attach_limit: Option<usize>,
        /// Handles whose detach reports an error (the element is still removed).
        stuck: Vec<u32>,
    }

    impl RecordingSurface {
        fn new(width: f32, height: f32) -> Self {
            Self {
                viewport: Viewport::new(width, height),
                ..Default::default()
            }
        }
    }

    impl Surface for RecordingSurface {
        type Handle = u32;
        type Error = String;

        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn attach(&mut self, petal: &PetalInstance) -> Result<u32, String> {
            if self.fail_attach || self.attach_limit.is_some_and(|n| self.attached >= n) {
                return Err("attach failed".into());
            }
            let id = self.next_id;
            self.next_id += 1;
            self.live.insert(id, *petal);
            self.attached += 1;
            Ok(id)
        }

        fn detach(&mut self, handle: u32) -> Result<(), String> {
            if self.stuck.contains(&handle) {
                self.live.remove(&handle);
                return Err(format!("detach failed for {}", handle));
            }
            self.live
                .remove(&handle)
                .map(|_| self.detached += 1)
                .ok_or_else(|| format!("unknown handle {}", handle))
        }

        fn draw(&mut self, handle: &u32, petal: &PetalInstance) -> Result<(), String> {
            let slot = self
                .live
                .get_mut(handle)
                .ok_or_else(|| format!("unknown handle {}", handle))?;
            *slot = *petal;
            self.draws += 1;
            Ok(())
        }
    }

    fn runner(count: usize) -> PetalRunner<RecordingSurface> {
        PetalRunner::new(
            FieldConfig::default().with_count(count),
            RecordingSurface::new(1000.0, 800.0),
        )
    }

    #[test]
    fn frame_before_start_is_noop() {
        let mut r = runner(10);
        r.frame().unwrap();
        assert_eq!(r.frame_count(), 0);
        assert!(r.surface().live.is_empty());
    }

    #[test]
    fn start_attaches_one_element_per_petal() {
        let mut r = runner(10);
        r.start().unwrap();
        assert!(r.is_running());
        assert_eq!(r.surface().live.len(), 10);

        // Idempotent
        r.start().unwrap();
        assert_eq!(r.surface().live.len(), 10);
    }

    #[test]
    fn frames_keep_element_count_constant() {
        let mut r = PetalRunner::new(
            FieldConfig::default().with_count(30),
            RecordingSurface::new(60.0, 40.0),
        );
        r.start().unwrap();
        for _ in 0..500 {
            r.frame().unwrap();
            assert_eq!(r.surface().live.len(), 30);
        }
        assert_eq!(r.frame_count(), 500);
        // Tiny viewport: plenty of petals were swapped out.
        assert!(r.surface().detached > 0);
        assert_eq!(r.surface().attached - r.surface().detached, 30);
        assert_eq!(r.surface().draws, 30 * 500);
    }

    #[test]
    fn drawn_state_matches_field() {
        let mut r = runner(5);
        r.start().unwrap();
        r.frame().unwrap();
        let mut drawn: Vec<PetalInstance> = r.surface().live.values().copied().collect();
        let mut expected: Vec<PetalInstance> = r
            .field()
            .particles()
            .iter()
            .map(|p| p.to_instance(r.field().config().aspect))
            .collect();
        let key = |p: &PetalInstance| (p.x, p.y);
        drawn.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap());
        expected.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap());
        assert_eq!(drawn, expected);
    }

    #[test]
    fn recycled_petal_gets_a_fresh_element() {
        let mut r = runner(3);
        r.start().unwrap();
        *r.field_mut().particle_mut(1).unwrap() =
            Particle::new(Vec2::new(500.0, 2000.0), 10.0).with_velocity(Vec2::new(0.0, 1.0));
        r.frame().unwrap();
        assert_eq!(r.surface().attached, 4);
        assert_eq!(r.surface().detached, 1);
        assert_eq!(r.surface().live.len(), 3);
    }

    #[test]
    fn resize_recycles_out_of_bounds_petals() {
        let mut r = runner(3);
        r.start().unwrap();
        *r.field_mut().particle_mut(0).unwrap() = Particle::new(Vec2::new(900.0, 100.0), 10.0);
        *r.field_mut().particle_mut(1).unwrap() = Particle::new(Vec2::new(100.0, 100.0), 10.0);
        *r.field_mut().particle_mut(2).unwrap() = Particle::new(Vec2::new(200.0, 100.0), 10.0);

        r.surface_mut().viewport = Viewport::new(400.0, 800.0);
        r.resize().unwrap();

        assert_eq!(r.field().viewport(), Viewport::new(400.0, 800.0));
        assert!(r.field().particles()[0].pos.x < 400.0);
        assert_eq!(r.surface().detached, 1);
        assert_eq!(r.surface().live.len(), 3);
    }

    #[test]
    fn resize_while_stopped_touches_no_elements() {
        let mut r = runner(3);
        *r.field_mut().particle_mut(0).unwrap() = Particle::new(Vec2::new(900.0, 100.0), 10.0);
        r.surface_mut().viewport = Viewport::new(400.0, 800.0);
        r.resize().unwrap();
        assert_eq!(r.surface().attached, 0);
        assert!(r.field().particles()[0].pos.x < 400.0);
    }

    #[test]
    fn stop_detaches_everything_and_restart_works() {
        let mut r = runner(8);
        r.start().unwrap();
        r.frame().unwrap();
        r.stop().unwrap();
        assert!(!r.is_running());
        assert!(r.surface().live.is_empty());

        // Frames after stop do nothing.
        r.frame().unwrap();
        assert_eq!(r.frame_count(), 1);

        r.start().unwrap();
        assert_eq!(r.surface().live.len(), 8);
    }

    #[test]
    fn attach_failure_propagates() {
        let mut r = runner(2);
        r.surface_mut().fail_attach = true;
        assert_eq!(r.start(), Err("attach failed".to_string()));
        assert!(!r.is_running());
    }

    #[test]
    fn instance_buffer_tracks_field() {
        let mut r = runner(6);
        assert_eq!(r.instance_count(), 6);
        assert!(!r.instances_ptr().is_null());
        r.start().unwrap();
        r.frame().unwrap();
        assert_eq!(r.instance_count(), 6);
    }

    #[test]
    fn failed_start_leaves_nothing_attached() {
        let mut r = runner(4);
        r.surface_mut().attach_limit = Some(2);
        assert!(r.start().is_err());
        assert!(!r.is_running());
        assert!(r.surface().live.is_empty());
        assert_eq!(r.surface().detached, 2);

        r.surface_mut().attach_limit = None;
        r.start().unwrap();
        assert_eq!(r.surface().live.len(), r.field().len());

        // Every slot has its own element and all of them get drawn.
        r.frame().unwrap();
        assert_eq!(r.surface().draws, 4);
    }

    #[test]
    fn stop_detaches_all_even_when_one_fails() {
        let mut r = runner(5);
        r.start().unwrap();
        let first = *r.surface().live.keys().min().unwrap();
        r.surface_mut().stuck.push(first);

        assert!(r.stop().is_err());
        assert!(!r.is_running());
        assert!(r.surface().live.is_empty());
        assert_eq!(r.surface().detached, 4);
    }
}
