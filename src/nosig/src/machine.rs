//! The signal commands and the loop that applies them, one at a time and in
//! the order given, to a `SignalContext`.

use platform::SignalBackend;
use posix::{Disposition, MaskHow, SignalRange};

use crate::{
    context::SignalContext,
    error::{NosigError, NosigResult},
    range_ops::Partition,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset,
    Ignore(String),
    IgnoreAll(Partition),
    Default(String),
    DefaultAll(Partition),
    Add(String),
    Del(String),
    Empty,
    Fill,
    Block,
    Unblock,
    Set,
    BlockAll(Partition),
    UnblockAll(Partition),
    Verbose,
}

fn partition_suffix(name: &str) -> Option<(&str, Partition)> {
    if let Some(base) = name.strip_suffix("-all-std") {
        Some((base, Partition::Standard))
    } else if let Some(base) = name.strip_suffix("-all-rt") {
        Some((base, Partition::Realtime))
    } else {
        name.strip_suffix("-all").map(|base| (base, Partition::All))
    }
}

impl Command {
    /// Builds the command for option `name` (long form, without dashes).
    pub fn from_option(name: &str, value: Option<&str>) -> NosigResult<Self> {
        let with_spec = |f: fn(String) -> Command| {
            value
                .map(|v| f(v.to_string()))
                .ok_or_else(|| NosigError::UsageError(format!("option '{}' requires a signal", name)))
        };
        let cmd = match name {
            "ignore" => return with_spec(Command::Ignore),
            "default" => return with_spec(Command::Default),
            "add" => return with_spec(Command::Add),
            "del" => return with_spec(Command::Del),
            _ if value.is_some() => {
                return Err(NosigError::UsageError(format!(
                    "option '{}' does not take a value",
                    name
                )))
            }
            "reset" => Command::Reset,
            "empty" => Command::Empty,
            "fill" => Command::Fill,
            "block" => Command::Block,
            "unblock" => Command::Unblock,
            "set" => Command::Set,
            "verbose" => Command::Verbose,
            _ => match partition_suffix(name) {
                Some(("ignore", p)) => Command::IgnoreAll(p),
                Some(("default", p)) => Command::DefaultAll(p),
                Some(("block", p)) => Command::BlockAll(p),
                Some(("unblock", p)) => Command::UnblockAll(p),
                _ => return Err(NosigError::UsageError(format!("unknown option '{}'", name))),
            },
        };
        Ok(cmd)
    }

    pub fn name(&self) -> String {
        let (base, partition) = match self {
            Command::Reset => return "reset".to_string(),
            Command::Ignore(_) => return "ignore".to_string(),
            Command::Default(_) => return "default".to_string(),
            Command::Add(_) => return "add".to_string(),
            Command::Del(_) => return "del".to_string(),
            Command::Empty => return "empty".to_string(),
            Command::Fill => return "fill".to_string(),
            Command::Block => return "block".to_string(),
            Command::Unblock => return "unblock".to_string(),
            Command::Set => return "set".to_string(),
            Command::Verbose => return "verbose".to_string(),
            Command::IgnoreAll(p) => ("ignore", p),
            Command::DefaultAll(p) => ("default", p),
            Command::BlockAll(p) => ("block", p),
            Command::UnblockAll(p) => ("unblock", p),
        };
        match partition {
            Partition::All => format!("{}-all", base),
            p => format!("{}-all-{}", base, p.as_str()),
        }
    }

    pub fn needs_realtime(&self) -> bool {
        matches!(
            self,
            Command::IgnoreAll(Partition::Realtime)
                | Command::DefaultAll(Partition::Realtime)
                | Command::BlockAll(Partition::Realtime)
                | Command::UnblockAll(Partition::Realtime)
        )
    }
}

impl<B: SignalBackend> SignalContext<B> {
    pub fn apply(&mut self, cmd: &Command) -> NosigResult<()> {
        if cmd.needs_realtime() && self.catalog.realtime().is_none() {
            return Err(NosigError::UnsupportedRealtime {
                command: cmd.name(),
            });
        }
        logger::debug!("{:?}", cmd);
        match cmd {
            Command::Reset => {
                self.apply_mask_range(MaskHow::Unblock, SignalRange::empty());
                let all = self.partition_range(Partition::All, "reset")?;
                self.set_disposition(all, Disposition::Default);
            }
            Command::Ignore(spec) => {
                let sig = self.resolve(spec)?;
                self.set_disposition(SignalRange::single(sig), Disposition::Ignore);
            }
            Command::Default(spec) => {
                let sig = self.resolve(spec)?;
                self.set_disposition(SignalRange::single(sig), Disposition::Default);
            }
            Command::IgnoreAll(p) => {
                let range = self.partition_range(*p, &cmd.name())?;
                self.set_disposition(range, Disposition::Ignore);
            }
            Command::DefaultAll(p) => {
                let range = self.partition_range(*p, &cmd.name())?;
                self.set_disposition(range, Disposition::Default);
            }
            Command::Add(spec) => {
                let sig = self.resolve(spec)?;
                self.working_set.add(sig);
            }
            Command::Del(spec) => {
                let sig = self.resolve(spec)?;
                self.working_set.del(sig);
            }
            Command::Empty => self.working_set.empty(),
            Command::Fill => self.fill_working_set(),
            Command::Block => self.block_working_set(),
            Command::Unblock => self.unblock_working_set(),
            Command::Set => self.set_mask_to_working_set(),
            Command::BlockAll(p) => {
                let excluded = self.partition_exclusion(*p, &cmd.name())?;
                self.apply_mask_range(MaskHow::Block, excluded);
            }
            Command::UnblockAll(p) => {
                let excluded = self.partition_exclusion(*p, &cmd.name())?;
                self.apply_mask_range(MaskHow::Unblock, excluded);
            }
            Command::Verbose => {
                self.verbose += 1;
                logger::set_verbosity(self.verbose);
            }
        }
        Ok(())
    }

    /// Applies `cmds` in order, stopping at the first failure.
    pub fn run<'a, I>(&mut self, cmds: I) -> NosigResult<()>
    where
        I: IntoIterator<Item = &'a Command>,
    {
        for cmd in cmds {
            self.apply(cmd)?;
        }
        Ok(())
    }
}
