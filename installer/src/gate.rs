//! The up-front allow/deny decision.

use crate::context::{ExecutionContext, InvocationMode};

/// Decides whether the rest of the pipeline runs at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadGate;

impl DownloadGate {
    /// Return `false` when the host disabled driver installation or is
    /// removing the project's dependencies.
    ///
    /// Pure: no I/O and no output.
    #[must_use]
    pub fn should_allow(self, ctx: &ExecutionContext) -> bool {
        !ctx.modes().disabled && ctx.invocation() != InvocationMode::Remove
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MapReader, keys};
    use crate::platform::Platform;
    use camino::Utf8Path;
    use rstest::rstest;

    fn ctx(reader: &MapReader) -> ExecutionContext {
        ExecutionContext::from_reader(
            Utf8Path::new("/project"),
            reader,
            Platform::from_parts("linux", "x86_64"),
            Default::default(),
        )
    }

    #[rstest]
    #[case::defaults(MapReader::new(), true)]
    #[case::update(MapReader::new().with(keys::MODE, "update"), true)]
    #[case::skip_flag(MapReader::new().with(keys::SKIP, "1"), false)]
    #[case::remove(MapReader::new().with(keys::MODE, "remove"), false)]
    #[case::verbose_only(MapReader::new().with(keys::VERBOSE, "1"), true)]
    fn gate_decisions(#[case] reader: MapReader, #[case] expected: bool) {
        assert_eq!(DownloadGate.should_allow(&ctx(&reader)), expected);
    }

    #[test]
    fn unsupported_platform_does_not_close_the_gate() {
        let ctx = ExecutionContext::from_reader(
            Utf8Path::new("/project"),
            &MapReader::new(),
            Platform::from_parts("haiku", "m68k"),
            Default::default(),
        );
        assert!(DownloadGate.should_allow(&ctx));
    }
}
