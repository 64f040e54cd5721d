use std::str::FromStr;

use splat_engine::camera::ControlMode;

pub const ENV_POINTS: &str = "SPLAT_VIEWER_POINTS";
pub const ENV_MODE: &str = "SPLAT_VIEWER_MODE";
pub const ENV_SCALE: &str = "SPLAT_VIEWER_SCALE";
pub const ENV_LOG: &str = "SPLAT_VIEWER_LOG";

/// Viewer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Size of the generated scene.
    pub points: u32,
    /// Navigation mode at startup.
    pub mode: ControlMode,
    /// Initial splat scale.
    pub scale: f32,
    /// SH degree evaluated by preprocess.
    pub sh_degree: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            points: 200_000,
            mode: ControlMode::Orbit,
            scale: 1.0,
            sh_degree: 3,
        }
    }
}

impl ViewerConfig {
    /// Defaults overridden by `SPLAT_VIEWER_*` variables.
    ///
    /// Invalid values are reported and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(points) = parse(&lookup, ENV_POINTS).filter(|p: &u32| {
            let ok = *p > 0;
            if !ok {
                log::warn!("{ENV_POINTS} must be positive; ignored");
            }
            ok
        }) {
            config.points = points;
        }

        if let Some(mode) = lookup(ENV_MODE) {
            match parse_mode(&mode) {
                Some(mode) => config.mode = mode,
                None => log::warn!("{ENV_MODE}={mode:?} is not `orbit` or `fps`; ignored"),
            }
        }

        if let Some(scale) = parse(&lookup, ENV_SCALE).filter(|s: &f32| {
            let ok = s.is_finite() && *s > 0.0;
            if !ok {
                log::warn!("{ENV_SCALE} must be a positive number; ignored");
            }
            ok
        }) {
            config.scale = scale;
        }

        config
    }

    /// Logger filter from `SPLAT_VIEWER_LOG`; `None` defers to `RUST_LOG`.
    ///
    /// Read separately from [`ViewerConfig::from_env`] so logging can be up
    /// before any configuration warning is emitted.
    pub fn log_filter_from_env() -> Option<String> {
        log_filter(|name| std::env::var(name).ok())
    }
}

fn log_filter(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    lookup(ENV_LOG).filter(|f| !f.trim().is_empty())
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("{name}={raw:?} is not valid; ignored");
            None
        }
    }
}

fn parse_mode(raw: &str) -> Option<ControlMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "orbit" => Some(ControlMode::Orbit),
        "fps" => Some(ControlMode::Fps),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with(vars: &[(&str, &str)]) -> ViewerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ViewerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(with(&[]), ViewerConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = with(&[
            (ENV_POINTS, "1234"),
            (ENV_MODE, " FPS "),
            (ENV_SCALE, "0.5"),
        ]);
        assert_eq!(config.points, 1234);
        assert_eq!(config.mode, ControlMode::Fps);
        assert_eq!(config.scale, 0.5);
    }

    fn log_var(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name| (name == ENV_LOG).then(|| value.to_string())
    }

    #[test]
    fn log_filter_ignores_blank_values() {
        assert_eq!(log_filter(log_var("debug")).as_deref(), Some("debug"));
        assert_eq!(log_filter(log_var("  ")), None);
        assert_eq!(log_filter(|_| None), None);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let config = with(&[
            (ENV_POINTS, "0"),
            (ENV_MODE, "walk"),
            (ENV_SCALE, "-2"),
        ]);
        assert_eq!(config, ViewerConfig::default());

        let config = with(&[(ENV_POINTS, "lots"), (ENV_SCALE, "NaN")]);
        assert_eq!(config, ViewerConfig::default());
    }
}
