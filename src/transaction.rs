//! Unsigned programmable transaction descriptors.
//!
//! The client never signs. It builds the descriptor, serializes it to JSON and
//! hands it to whatever signer/executor the wallet layer provides. Pure
//! arguments carry their BCS encoding so a signer can assemble the final
//! transaction bytes without re-deriving them.

use serde::ser::{Error as _, SerializeStruct};
use serde::{Serialize, Serializer};

/// A pure (non-object) call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PureValue {
    U64(u64),
    String(String),
}

impl PureValue {
    /// BCS encoding of the value as the Move function expects it.
    pub fn to_bcs(&self) -> Result<Vec<u8>, bcs::Error> {
        match self {
            PureValue::U64(v) => bcs::to_bytes(v),
            PureValue::String(s) => bcs::to_bytes(s),
        }
    }

    fn type_tag(&self) -> &'static str {
        match self {
            PureValue::U64(_) => "u64",
            PureValue::String(_) => "0x1::string::String",
        }
    }
}

impl Serialize for PureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bcs = self.to_bcs().map_err(S::Error::custom)?;
        let mut state = serializer.serialize_struct("PureValue", 3)?;
        state.serialize_field("type", self.type_tag())?;
        match self {
            // u64 travels as a decimal string, as Sui JSON does
            PureValue::U64(v) => state.serialize_field("value", &v.to_string())?,
            PureValue::String(s) => state.serialize_field("value", s)?,
        }
        state.serialize_field("bcs", &format!("0x{}", hex::encode(bcs)))?;
        state.end()
    }
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CallArg {
    Pure { value: PureValue },
    /// Object by id; version and mutability are resolved by the signer.
    Object { object_id: String },
}

/// Reference to a value inside a programmable transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    SplitCoins { coin: Argument, amounts: Vec<Argument> },
    MoveCall(MoveCall),
}

/// An unsigned, unsubmitted programmable transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TipTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl TipTransaction {
    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::default()
    }

    /// The input an `Argument::Input` points at.
    pub fn input(&self, arg: Argument) -> Option<&CallArg> {
        match arg {
            Argument::Input(idx) => self.inputs.get(idx as usize),
            _ => None,
        }
    }

    /// Amount split off the gas coin by the first `SplitCoins` command.
    pub fn split_amount(&self) -> Option<u64> {
        self.commands.iter().find_map(|cmd| match cmd {
            Command::SplitCoins { amounts, .. } => match amounts.first().and_then(|a| self.input(*a)) {
                Some(CallArg::Pure { value: PureValue::U64(v) }) => Some(*v),
                _ => None,
            },
            _ => None,
        })
    }

    pub fn move_call(&self) -> Option<&MoveCall> {
        self.commands.iter().find_map(|cmd| match cmd {
            Command::MoveCall(call) => Some(call),
            _ => None,
        })
    }
}

/// Incremental builder mirroring Sui's programmable transaction builder.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    tx: TipTransaction,
}

impl TransactionBuilder {
    fn push_input(&mut self, arg: CallArg) -> Argument {
        self.tx.inputs.push(arg);
        Argument::Input((self.tx.inputs.len() - 1) as u16)
    }

    fn push_command(&mut self, cmd: Command) -> Argument {
        self.tx.commands.push(cmd);
        Argument::Result((self.tx.commands.len() - 1) as u16)
    }

    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.push_input(CallArg::Pure { value: PureValue::U64(value) })
    }

    pub fn pure_string(&mut self, value: impl Into<String>) -> Argument {
        self.push_input(CallArg::Pure { value: PureValue::String(value.into()) })
    }

    pub fn object(&mut self, object_id: impl Into<String>) -> Argument {
        self.push_input(CallArg::Object { object_id: object_id.into() })
    }

    /// Split one coin per amount off `coin`; a single amount yields `Result(n)`.
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Argument {
        self.push_command(Command::SplitCoins { coin, amounts })
    }

    pub fn move_call(
        &mut self,
        package: impl Into<String>,
        module: impl Into<String>,
        function: impl Into<String>,
        arguments: Vec<Argument>,
    ) -> Argument {
        self.push_command(Command::MoveCall(MoveCall {
            package: package.into(),
            module: module.into(),
            function: function.into(),
            type_arguments: Vec::new(),
            arguments,
        }))
    }

    pub fn finish(self) -> TipTransaction {
        self.tx
    }
}
