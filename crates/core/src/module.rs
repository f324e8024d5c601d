//! The GUI module: produces systems and drives them from the host's update.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capability::Tickable;
use crate::config::GuiConfig;
use crate::diagnostics::{Diagnostics, LogBuffer};
use crate::error::GuiError;
use crate::factory::{Factory, Handle};
use crate::hierarchy::Hierarchy;
use crate::system::System;
use crate::term::{CrosstermSurface, EventSurface};
use crate::types::MAX_BATCH;

pub type SystemId<S> = Handle<System<S>>;

/// Creation request for systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRequest {
    #[serde(default = "one")]
    pub count: usize,
    /// Attach a visible editor regardless of configuration.
    #[serde(default)]
    pub editor: bool,
}

fn one() -> usize {
    1
}

impl Default for SystemRequest {
    fn default() -> Self {
        Self {
            count: 1,
            editor: false,
        }
    }
}

type Opener<S> = Box<dyn FnMut() -> anyhow::Result<S>>;

pub struct Gui<S: EventSurface> {
    systems: Factory<System<S>>,
    open: Opener<S>,
    config: GuiConfig,
    logs: Option<LogBuffer>,
    created: u64,
    quit_seen: bool,
    diag: Diagnostics,
}

impl Gui<CrosstermSurface> {
    /// Systems on the process terminal. Only one should be alive at a time.
    pub fn crossterm(config: GuiConfig, logs: Option<LogBuffer>, diag: Diagnostics) -> Self {
        Self::with_opener(config, logs, diag, CrosstermSurface::open)
    }
}

impl<S: EventSurface> Gui<S> {
    /// Systems on whatever surfaces `open` returns.
    pub fn with_opener(
        config: GuiConfig,
        logs: Option<LogBuffer>,
        diag: Diagnostics,
        open: impl FnMut() -> anyhow::Result<S> + 'static,
    ) -> Self {
        Self {
            systems: Factory::new(),
            open: Box::new(open),
            config,
            logs,
            created: 0,
            quit_seen: false,
            diag,
        }
    }

    /// Create `request.count` systems. Either all come up or none are kept.
    pub fn create(&mut self, request: &SystemRequest) -> Result<Vec<SystemId<S>>, GuiError> {
        if request.count > MAX_BATCH {
            let err = GuiError::BatchTooLarge {
                requested: request.count,
                max: MAX_BATCH,
            };
            tracing::error!(parent: self.diag.span(), error = %err, "system creation refused");
            return Err(err);
        }

        let mut config = self.config.clone();
        config.editor_on_start |= request.editor;

        let Self {
            systems,
            open,
            logs,
            created,
            diag,
            ..
        } = self;
        let result = systems.try_produce(request.count, |_| {
            *created += 1;
            let surface = open().map_err(GuiError::Surface)?;
            System::new(surface, &config, logs.clone(), diag.child_with_id("system", *created))
        });

        match &result {
            Ok(ids) => tracing::info!(parent: diag.span(), count = ids.len(), "systems created"),
            Err(err) => tracing::error!(parent: diag.span(), error = %err, "system creation failed"),
        }
        result
    }

    /// Tick every system in creation order and retire the ones that quit.
    ///
    /// Returns `false` once some system has quit and none are left.
    pub fn update(&mut self, dt: Duration) -> bool {
        let diag = &self.diag;
        let retired = self.systems.retain_mut(|id, system| {
            let alive = system.update(dt);
            if !alive {
                tracing::info!(parent: diag.span(), %id, "system quit");
            }
            alive
        });
        if retired > 0 {
            self.quit_seen = true;
        }
        !(self.quit_seen && self.systems.is_empty())
    }

    pub fn destroy(&mut self, id: SystemId<S>) -> bool {
        self.systems.destroy(id).is_some()
    }

    pub fn system(&self, id: SystemId<S>) -> Option<&System<S>> {
        self.systems.get(id)
    }

    pub fn system_mut(&mut self, id: SystemId<S>) -> Option<&mut System<S>> {
        self.systems.get_mut(id)
    }

    /// Forward a hierarchy change to every system.
    pub fn refresh(&mut self, env: &dyn Hierarchy) {
        for (_, system) in self.systems.iter_mut() {
            system.refresh(env);
        }
    }

    pub fn ids(&self) -> Vec<SystemId<S>> {
        self.systems.handles()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }
}

impl<S: EventSurface> Tickable for Gui<S> {
    fn update(&mut self, dt: Duration) -> bool {
        Gui::update(self, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::HeadlessSurface;
    use crossterm::event::KeyCode;

    fn headless() -> Gui<HeadlessSurface> {
        Gui::with_opener(GuiConfig::default(), None, Diagnostics::detached(), || {
            Ok(HeadlessSurface::new(20, 5))
        })
    }

    #[test]
    fn quit_systems_are_retired() {
        let mut gui = headless();
        let ids = gui
            .create(&SystemRequest {
                count: 2,
                editor: false,
            })
            .unwrap();
        assert!(gui.update(Duration::ZERO));

        gui.system_mut(ids[0]).unwrap().surface_mut().press(KeyCode::Char('q'));
        assert!(gui.update(Duration::ZERO));
        assert!(gui.update(Duration::ZERO));
        assert_eq!(gui.ids(), vec![ids[1]]);

        gui.system_mut(ids[1]).unwrap().surface_mut().press(KeyCode::Char('q'));
        gui.update(Duration::ZERO);
        assert!(!gui.update(Duration::ZERO));
        assert!(gui.is_empty());
    }

    #[test]
    fn oversized_requests_are_refused_without_opening_surfaces() {
        let mut gui = headless();
        let req: SystemRequest =
            serde_json::from_str(r#"{"count":18446744073709551615}"#).unwrap();
        assert!(matches!(
            gui.create(&req),
            Err(GuiError::BatchTooLarge { requested, max: MAX_BATCH }) if requested == usize::MAX
        ));

        let over = SystemRequest {
            count: MAX_BATCH + 1,
            editor: false,
        };
        assert!(gui.create(&over).is_err());
        assert!(gui.is_empty());
        assert_eq!(gui.create(&SystemRequest::default()).unwrap().len(), 1);
    }

    #[test]
    fn empty_module_keeps_running() {
        let mut gui = headless();
        assert!(gui.update(Duration::from_millis(16)));
        let ids = gui.create(&SystemRequest::default()).unwrap();
        assert!(gui.destroy(ids[0]));
        assert!(gui.update(Duration::from_millis(16)));
    }

    #[test]
    fn failed_open_keeps_nothing() {
        let mut opened = 0;
        let mut gui = Gui::with_opener(GuiConfig::default(), None, Diagnostics::detached(), move || {
            opened += 1;
            if opened > 1 {
                anyhow::bail!("no more terminals");
            }
            Ok(HeadlessSurface::new(4, 4))
        });
        let result = gui.create(&SystemRequest {
            count: 2,
            editor: true,
        });
        assert!(matches!(result, Err(GuiError::Surface(_))));
        assert!(gui.is_empty());
    }
}
