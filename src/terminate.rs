use std::process;

use crate::level::Level;

/// Everything the termination step needs: the triggering severity and the
/// signal or exception identifier captured when the fatal event was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitDisposition {
    pub level: Level,
    pub signal_id: i32,
}

impl ExitDisposition {
    /// Shell convention: 128 + signal for signal-triggered events, 1 for
    /// everything else.
    pub fn exit_code(self) -> i32 {
        if self.signal_id > 0 {
            128 + self.signal_id
        } else {
            1
        }
    }
}

/// Final collaborator of the fatal sequence, invoked exactly once at the very
/// end. The diverging return type makes "termination returned" unrepresentable
/// rather than a defensive branch.
pub trait Terminate: Send + Sync {
    fn terminate(&self, disposition: ExitDisposition) -> !;
}

/// Exits the process with the disposition-derived code.
pub struct DefaultTerminator;

impl Terminate for DefaultTerminator {
    fn terminate(&self, disposition: ExitDisposition) -> ! {
        process::exit(disposition.exit_code())
    }
}

#[test]
fn exit_code_follows_the_shell_convention() {
    let signal = ExitDisposition {
        level: Level::Fatal,
        signal_id: 11,
    };
    assert_eq!(signal.exit_code(), 139);

    let plain = ExitDisposition {
        level: Level::Fatal,
        signal_id: 0,
    };
    assert_eq!(plain.exit_code(), 1);
}
