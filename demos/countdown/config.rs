//! Configuration for the countdown demo.
//!
//! Three plain keys and one `[output]` section, enough to show comments,
//! integer coercion, and a nested object:
//!
//! ```ini
//! ;
//! ; Countdown settings
//!
//! ; Message to print at every cycle
//! message = message {n}
//!
//! ; Number of loop iterations
//! iterations_number = 3
//!
//! ; Seconds to sleep after each message
//! sleep = 1
//!
//! ; Output settings
//! [output]
//! prefix =
//! uppercase = false
//! ```

use std::sync::OnceLock;

use inimap::{FieldDescriptor, IniObject, StructuralType};

#[derive(Debug, Clone)]
pub struct CountdownConfig {
    pub message: String,
    pub iterations_number: u32,
    pub sleep: u64,
    pub output: OutputConfig,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            message: "message {n}".into(),
            iterations_number: 3,
            sleep: 1,
            output: OutputConfig::default(),
        }
    }
}

impl IniObject for CountdownConfig {
    fn structure() -> &'static StructuralType<Self> {
        static STRUCTURE: OnceLock<StructuralType<CountdownConfig>> = OnceLock::new();
        STRUCTURE.get_or_init(|| {
            type Field = FieldDescriptor<CountdownConfig>;
            StructuralType::new("CountdownConfig")
                .doc("Countdown settings")
                .field(
                    Field::value("message", |c| &c.message, |c| &mut c.message)
                        .doc("Message to print at every cycle\n\n`{n}` is replaced by the cycle number."),
                )
                .field(
                    Field::value("iterationsNumber", |c| &c.iterations_number, |c| &mut c.iterations_number)
                        .doc("Number of loop iterations"),
                )
                .field(Field::value("sleep", |c| &c.sleep, |c| &mut c.sleep).doc("Seconds to sleep after each message"))
                .field(Field::nested("output", |c| &c.output, |c| &mut c.output).doc("Output settings"))
        })
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub prefix: String,
    pub uppercase: bool,
}

impl IniObject for OutputConfig {
    fn structure() -> &'static StructuralType<Self> {
        static STRUCTURE: OnceLock<StructuralType<OutputConfig>> = OnceLock::new();
        STRUCTURE.get_or_init(|| {
            type Field = FieldDescriptor<OutputConfig>;
            StructuralType::new("OutputConfig")
                .field(Field::value("prefix", |c| &c.prefix, |c| &mut c.prefix))
                .field(Field::value("uppercase", |c| &c.uppercase, |c| &mut c.uppercase))
        })
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}
