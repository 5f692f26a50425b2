/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Message stream encoder.
//!
//! Turns [`Message`]s into back-to-back wire units on any [`Write`]
//! sink. Each unit is a presence map followed by the template identifier
//! and the field bodies. Dictionary state carries across messages until
//! [`FastEncoder::reset`].

use fastwire_codec::PresenceMapBuilder;
use fastwire_core::{DynError, Result};
use fastwire_template::{Context, Message, TemplateRegistry};
use std::io::Write;
use std::sync::Arc;
use tracing::trace;

/// Encodes one message into a standalone wire unit.
///
/// [`FastEncoder::write_message`] wraps this for streaming sinks; callers
/// that frame messages themselves can drive it directly against their own
/// context.
///
/// # Errors
/// [`DynError::TemplateNotRegistered`] when the message's template has no
/// identifier in `registry`, plus the field encoding failures.
pub fn encode_message(
    context: &mut Context,
    registry: &dyn TemplateRegistry,
    message: &Message,
) -> Result<Vec<u8>> {
    let template = message.template();
    let id = registry
        .id_for_name(template.name())
        .ok_or_else(|| DynError::TemplateNotRegistered {
            name: template.name().to_string(),
        })?;

    let mut body = Vec::new();
    let mut pmap = PresenceMapBuilder::with_capacity(template.pmap_bits());
    template.encode(&mut body, &mut pmap, message.values(), id, context)?;

    let pmap_bytes = pmap.encode();
    let mut unit = Vec::with_capacity(pmap_bytes.len() + body.len());
    unit.extend_from_slice(&pmap_bytes);
    unit.extend_from_slice(&body);
    trace!(template = %template.name(), id, bytes = unit.len(), "encoded message");
    Ok(unit)
}

/// Encodes messages onto a byte sink.
pub struct FastEncoder<W: Write> {
    writer: W,
    registry: Arc<dyn TemplateRegistry>,
    context: Context,
}

impl<W: Write> FastEncoder<W> {
    /// Creates an encoder with a strict-handler context.
    pub fn new(writer: W, registry: Arc<dyn TemplateRegistry>) -> Self {
        Self::with_context(writer, registry, Context::new())
    }

    /// Creates an encoder around a caller-built context.
    pub fn with_context(writer: W, registry: Arc<dyn TemplateRegistry>, context: Context) -> Self {
        Self {
            writer,
            registry,
            context,
        }
    }

    /// Encodes one message and writes its wire unit.
    ///
    /// # Errors
    /// [`DynError::TemplateNotRegistered`] when the message's template has
    /// no identifier here, plus the field encoding and I/O failures.
    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        let unit = encode_message(&mut self.context, self.registry.as_ref(), message)?;
        self.writer.write_all(&unit)?;
        Ok(())
    }

    /// Flushes the underlying sink.
    ///
    /// # Errors
    /// The sink's I/O failures.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Returns every dictionary to its initial state.
    pub fn reset(&mut self) {
        self.context.reset();
    }

    /// The underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Mutable access to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes the encoder, returning the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
