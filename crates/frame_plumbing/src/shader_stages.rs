/// The shader objects of one graphics pipeline.
///
/// Stages are created vertex first, then geometry, then pixel. Fields are
/// declared in the opposite order so dropping the set releases the newest
/// stage first. When a later stage fails, [`ShaderStages::build`] returns
/// early and the stages already created are dropped on the way out.
#[derive(Debug)]
pub struct ShaderStages<V, G, P> {
    pub pixel: P,
    pub geometry: Option<G>,
    pub vertex: V,
}

impl<V, G, P> ShaderStages<V, G, P> {
    pub fn build<E>(
        vertex: impl FnOnce() -> Result<V, E>,
        geometry: impl FnOnce() -> Result<Option<G>, E>,
        pixel: impl FnOnce() -> Result<P, E>,
    ) -> Result<Self, E> {
        let vertex = vertex()?;
        let geometry = geometry()?;
        let pixel = pixel()?;
        Ok(Self {
            pixel,
            geometry,
            vertex,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Debug)]
    struct Tracked {
        name: &'static str,
        log: Log,
    }

    impl Tracked {
        fn new(name: &'static str, log: &Log) -> Self {
            log.borrow_mut().push(format!("create {name}"));
            Self {
                name,
                log: log.clone(),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("release {}", self.name));
        }
    }

    #[test]
    fn teardown_runs_in_reverse_creation_order() {
        let log = Log::default();
        let stages = ShaderStages::<Tracked, Tracked, Tracked>::build::<String>(
            || Ok(Tracked::new("vertex", &log)),
            || Ok(Some(Tracked::new("geometry", &log))),
            || Ok(Tracked::new("pixel", &log)),
        )
        .unwrap();
        drop(stages);
        assert_eq!(
            *log.borrow(),
            vec![
                "create vertex",
                "create geometry",
                "create pixel",
                "release pixel",
                "release geometry",
                "release vertex",
            ]
        );
    }

    #[test]
    fn pixel_compile_failure_releases_the_vertex_shader() {
        let log = Log::default();
        let result = ShaderStages::<Tracked, Tracked, Tracked>::build(
            || Ok(Tracked::new("vertex", &log)),
            || Ok(None),
            || Err("PSMain: undeclared identifier 'Colour'".to_string()),
        );
        let err = result.unwrap_err();
        assert!(err.contains("PSMain"));
        assert_eq!(*log.borrow(), vec!["create vertex", "release vertex"]);
    }

    #[test]
    fn geometry_failure_skips_the_pixel_stage() {
        let log = Log::default();
        let mut pixel_attempted = false;
        let result = ShaderStages::<Tracked, Tracked, Tracked>::build(
            || Ok(Tracked::new("vertex", &log)),
            || Err("gs_4_0 not supported"),
            || {
                pixel_attempted = true;
                Ok(Tracked::new("pixel", &log))
            },
        );
        assert!(result.is_err());
        assert!(!pixel_attempted);
        assert_eq!(*log.borrow(), vec!["create vertex", "release vertex"]);
    }

    #[test]
    fn every_stage_is_released_exactly_once() {
        let log = Log::default();
        {
            let _stages = ShaderStages::<Tracked, Tracked, Tracked>::build::<()>(
                || Ok(Tracked::new("vertex", &log)),
                || Ok(None),
                || Ok(Tracked::new("pixel", &log)),
            )
            .unwrap();
        }
        let releases = log
            .borrow()
            .iter()
            .filter(|line| line.starts_with("release"))
            .count();
        assert_eq!(releases, 2);
    }
}
