//! Hyprland compositor events.
//!
//! [`HyprlandService`] reads Hyprland's event socket
//! (`$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`).
//! Each line is a frame `EVENT>>DATA`, with `DATA` holding the event's
//! arguments separated by commas. Frames become signals of the same name,
//! reachable from widgets under the `hyprland-on` prefix:
//!
//! ```
//! use borealis::prelude::*;
//! use borealis::ext::hyprland::HyprlandCallback;
//!
//! let label = Label::builder()
//!     .bindings(
//!         Bindings::new()
//!             .declare("hyprland_on_workspace", AttrValue::callback(|label: &Label, args| {
//!                 label.set_text(args[0].to_string());
//!             }))
//!             .from_annotation::<HyprlandCallback, _, _>("activewindow", |label: &Label, args| {
//!                 label.set_text(format!("{}: {}", args[0], args[1]));
//!             }),
//!     )
//!     .build();
//! # drop(label);
//! ```
//!
//! Every argument is a string; consumers parse numbers themselves.

use std::env;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use borealis_core::{
    Annotation, ArgKind, BorealisError, ConfigError, DecodeError, Service, ServiceAnnotation,
    ServiceSignal, SignalSchema, SignalSink,
};

use crate::config::{DEFAULT_RECV_BUFFER, HyprlandConfig};

/// Separator between the event name and its data.
pub const FRAME_SEPARATOR: &str = ">>";

/// Annotation of the Hyprland service.
#[derive(Debug)]
pub struct HyprlandCallback;

impl ServiceAnnotation for HyprlandCallback {
    const PREFIX: &'static str = "hyprland-on";
}

/// Every event Hyprland emits, with its number of arguments.
pub const EVENTS: &[(&str, usize)] = &[
    ("workspace", 1),
    ("workspacev2", 2),
    ("focusedmon", 2),
    ("focusedmonv2", 2),
    ("activewindow", 2),
    ("activewindowv2", 1),
    ("fullscreen", 1),
    ("monitorremoved", 1),
    ("monitoradded", 1),
    ("monitoraddedv2", 3),
    ("createworkspace", 1),
    ("createworkspacev2", 2),
    ("destroyworkspace", 1),
    ("destroyworkspacev2", 2),
    ("moveworkspace", 2),
    ("moveworkspacev2", 3),
    ("renameworkspace", 2),
    ("activespecial", 2),
    ("activespecialv2", 3),
    ("activelayout", 2),
    ("openwindow", 4),
    ("closewindow", 1),
    ("movewindow", 2),
    ("movewindowv2", 3),
    ("openlayer", 1),
    ("closelayer", 1),
    ("submap", 1),
    ("changefloatingmode", 2),
    ("urgent", 1),
    ("screencast", 2),
    ("windowtitle", 1),
    ("windowtitlev2", 2),
    ("togglegroup", 2),
    ("moveintogroup", 1),
    ("moveoutofgroup", 1),
    ("ignoregrouplock", 1),
    ("lockgroups", 1),
    ("configreloaded", 0),
    ("pin", 2),
    ("minimized", 2),
];

/// The signal schema of the Hyprland service.
pub fn event_schema() -> SignalSchema {
    EVENTS.iter().fold(SignalSchema::new(), |schema, (name, arity)| {
        schema.signal(*name, std::iter::repeat_n(ArgKind::Str, *arity))
    })
}

/// Decode one frame against `schema`.
///
/// The data is split into at most as many fields as the event has
/// arguments, so the last argument keeps any commas it contains.
///
/// # Errors
///
/// A missing separator, an unknown event or too few fields.
pub fn parse_frame(schema: &SignalSchema, frame: &str) -> Result<ServiceSignal, DecodeError> {
    let frame = frame.trim_end_matches(['\r', '\n']);
    let Some((event, data)) = frame.split_once(FRAME_SEPARATOR) else {
        return Err(DecodeError::MissingSeparator {
            frame: frame.to_string(),
        });
    };
    let arity = schema
        .signal_arg_types(event)
        .map(<[ArgKind]>::len)
        .ok_or_else(|| DecodeError::UnknownSignal {
            signal: event.to_string(),
        })?;
    let fields: Vec<&str> = if arity == 0 {
        Vec::new()
    } else {
        data.splitn(arity, ',').collect()
    };
    schema.decode(event, &fields)
}

/// The event socket path from the environment.
///
/// # Errors
///
/// [`ConfigError::MissingEnvironment`] if `XDG_RUNTIME_DIR` or
/// `HYPRLAND_INSTANCE_SIGNATURE` is unset.
pub fn socket_path_from_env() -> Result<PathBuf, ConfigError> {
    let runtime = env::var_os("XDG_RUNTIME_DIR").ok_or(ConfigError::MissingEnvironment {
        variable: "XDG_RUNTIME_DIR",
    })?;
    let signature = env::var_os("HYPRLAND_INSTANCE_SIGNATURE").ok_or(ConfigError::MissingEnvironment {
        variable: "HYPRLAND_INSTANCE_SIGNATURE",
    })?;
    Ok(PathBuf::from(runtime).join("hypr").join(signature).join(".socket2.sock"))
}

/// Reads Hyprland's event socket and emits one signal per event.
#[derive(Debug, Clone)]
pub struct HyprlandService {
    socket_path: PathBuf,
    recv_buffer: usize,
}

impl HyprlandService {
    /// A service reading `socket_path`.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            recv_buffer: DEFAULT_RECV_BUFFER,
        }
    }

    /// A service configured from `config`, falling back to the
    /// environment for the socket path.
    ///
    /// # Errors
    ///
    /// See [`socket_path_from_env`].
    pub fn from_config(config: &HyprlandConfig) -> Result<Self, ConfigError> {
        let socket_path = match &config.socket_path {
            Some(path) => path.clone(),
            None => socket_path_from_env()?,
        };
        Ok(Self {
            socket_path,
            recv_buffer: config.recv_buffer.max(1),
        })
    }

    /// The socket this service reads.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Read frames from `reader` until it ends, emitting each decodable
    /// one. Frames that cannot be decoded are logged and skipped.
    ///
    /// # Errors
    ///
    /// A read failure.
    pub fn pump<R: BufRead>(reader: R, sink: &SignalSink) -> io::Result<usize> {
        let mut reader = reader;
        let mut line = Vec::new();
        let mut emitted = 0;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(emitted);
            }
            let frame = match std::str::from_utf8(&line) {
                Ok(frame) => frame,
                Err(_) => {
                    tracing::warn!(target: "borealis::hyprland", error = %DecodeError::InvalidUtf8, "skipping frame");
                    continue;
                }
            };
            if frame.trim().is_empty() {
                continue;
            }
            match parse_frame(sink.schema(), frame) {
                Ok(signal) => {
                    if sink.emit(signal).is_ok() {
                        emitted += 1;
                    }
                }
                Err(error) => {
                    tracing::warn!(target: "borealis::hyprland", %error, "skipping frame");
                }
            }
        }
    }

    #[cfg(unix)]
    fn connect(&self) -> io::Result<impl BufRead> {
        let stream = std::os::unix::net::UnixStream::connect(&self.socket_path)?;
        Ok(BufReader::with_capacity(self.recv_buffer, stream))
    }

    #[cfg(not(unix))]
    fn connect(&self) -> io::Result<BufReader<io::Empty>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "the Hyprland event socket is only available on Unix",
        ))
    }
}

impl Service for HyprlandService {
    fn annotation(&self) -> Option<Annotation> {
        Some(Annotation::of::<HyprlandCallback>())
    }

    fn schema(&self) -> SignalSchema {
        event_schema()
    }

    fn name(&self) -> &'static str {
        "HyprlandService"
    }

    fn run(self: Box<Self>, sink: SignalSink) -> Result<(), BorealisError> {
        let reader = self.connect()?;
        tracing::info!(target: "borealis::hyprland", path = %self.socket_path.display(), "connected to event socket");
        let emitted = Self::pump(reader, &sink)?;
        tracing::info!(target: "borealis::hyprland", emitted, "event socket closed");
        Ok(())
    }
}
