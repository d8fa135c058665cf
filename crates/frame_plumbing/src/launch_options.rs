use eyre::eyre;
use eyre::Result;

/// Switches accepted on the command line. Both `-name` and `/name` work, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Start the driver fallback at the software rasterizer.
    pub use_warp_device: bool,
    pub vsync: bool,
    /// Exit after this many presented frames.
    pub frame_limit: Option<u64>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            use_warp_device: false,
            vsync: true,
            frame_limit: None,
        }
    }
}

fn switch_name(arg: &str) -> Option<&str> {
    arg.strip_prefix('-').or_else(|| arg.strip_prefix('/'))
}

impl LaunchOptions {
    pub fn from_env() -> Result<Self> {
        // skip the executable path
        Self::from_args(std::env::args().skip(1))
    }

    /// Unknown arguments are ignored.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let Some(name) = switch_name(arg.as_ref()) else {
                continue;
            };
            if name.eq_ignore_ascii_case("warp") {
                options.use_warp_device = true;
            } else if name.eq_ignore_ascii_case("novsync") {
                options.vsync = false;
            } else if name.eq_ignore_ascii_case("frames") {
                let value = args
                    .next()
                    .ok_or_else(|| eyre!("{} expects a frame count", arg.as_ref()))?;
                let value = value.as_ref();
                let count = value
                    .parse::<u64>()
                    .map_err(|e| eyre!("invalid frame count {value:?}: {e}"))?;
                options.frame_limit = Some(count);
            }
        }

        Ok(options)
    }

    /// Whether `presented` frames have used up the frame limit.
    pub fn frame_limit_reached(&self, presented: u64) -> bool {
        self.frame_limit.is_some_and(|limit| presented >= limit)
    }
}
