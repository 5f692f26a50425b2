/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Message stream decoder.
//!
//! Reads wire units off any [`Read`] source and rebuilds [`Message`]s.
//! The template identifier leads every unit: its presence bit says
//! whether the identifier was transmitted or rides the previous one, the
//! registry then supplies the template for the rest of the unit.
//!
//! End of input between units is a clean end of stream; inside a unit it
//! is an error.

use fastwire_codec::{integer, stream, PresenceMapReader};
use fastwire_core::{DynError, QName, Result, ScalarValue};
use fastwire_dictionary::DictionaryValue;
use fastwire_template::{Context, Message, TemplateRegistry, TEMPLATE_ID_NAME};
use std::io::Read;
use std::sync::Arc;
use tracing::trace;

/// Decodes messages from a byte source.
pub struct FastDecoder<R: Read> {
    reader: R,
    registry: Arc<dyn TemplateRegistry>,
    context: Context,
}

impl<R: Read> FastDecoder<R> {
    /// Creates a decoder with a strict-handler context.
    pub fn new(reader: R, registry: Arc<dyn TemplateRegistry>) -> Self {
        Self::with_context(reader, registry, Context::new())
    }

    /// Creates a decoder around a caller-built context.
    pub fn with_context(reader: R, registry: Arc<dyn TemplateRegistry>, context: Context) -> Self {
        Self {
            reader,
            registry,
            context,
        }
    }

    /// Decodes the next message, or `None` at a clean end of stream.
    ///
    /// # Errors
    /// [`DynError::UnknownTemplate`] for an unregistered identifier,
    /// [`DynError::MissingTemplateId`] when the first unit rides an
    /// identifier that was never transmitted, plus the field decoding and
    /// I/O failures.
    pub fn read_message(&mut self) -> Result<Option<Message>> {
        let Some(first) = stream::try_read_byte(&mut self.reader)? else {
            return Ok(None);
        };
        let mut pmap = PresenceMapReader::decode_after(first, &mut self.reader)?;

        let id = self.read_template_id(&mut pmap)?;
        let template = self
            .registry
            .template_by_id(id)
            .ok_or(DynError::UnknownTemplate(id))?;

        let mut message = template.decode(&mut self.reader, &mut pmap, &mut self.context)?;
        message.set_template_id(id);
        trace!(template = %template.name(), id, "decoded message");
        Ok(Some(message))
    }

    /// Returns every dictionary to its initial state.
    pub fn reset(&mut self) {
        self.context.reset();
    }

    /// Consumes the decoder, returning the source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// The identifier leads the unit as a mandatory copy field against
    /// the global dictionary.
    fn read_template_id(&mut self, pmap: &mut PresenceMapReader) -> Result<u32> {
        let key = QName::new(TEMPLATE_ID_NAME);
        if pmap.next_bit() {
            let raw = integer::decode_u64(&mut self.reader)?;
            let id = u32::try_from(raw).map_err(|_| DynError::TemplateIdOutOfRange(raw))?;
            self.context
                .store_global(key, DictionaryValue::Value(ScalarValue::UInt32(id)));
            Ok(id)
        } else {
            match self.context.lookup_global(&key) {
                DictionaryValue::Value(ScalarValue::UInt32(id)) => Ok(id),
                _ => Err(DynError::MissingTemplateId.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FastEncoder;
    use fastwire_core::{
        DecimalValue, FastError, FastType, LoggingErrorHandler, RepError,
    };
    use fastwire_template::{
        BasicTemplateRegistry, MessageTemplate, Operator, Scalar,
    };
    use std::io::Cursor;

    /// Builds wire bytes from a whitespace-separated bit string.
    fn bytes(bits: &str) -> Vec<u8> {
        bits.split_whitespace()
            .map(|byte| u8::from_str_radix(byte, 2).unwrap())
            .collect()
    }

    fn registry_with(id: u32, template: MessageTemplate) -> Arc<dyn TemplateRegistry> {
        let mut registry = BasicTemplateRegistry::new();
        registry.register(id, template).unwrap();
        Arc::new(registry)
    }

    fn decimal(mantissa: i64, exponent: i32) -> ScalarValue {
        ScalarValue::Decimal(DecimalValue::new(mantissa, exponent))
    }

    #[test]
    fn test_empty_template_stream() {
        let registry = registry_with(113, MessageTemplate::new("Empty"));
        let wire = bytes("11000000 11110001 10000000");
        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);

        let first = decoder.read_message().unwrap().unwrap();
        assert_eq!(first.name().name(), "Empty");
        assert_eq!(first.template_id(), Some(113));
        // The second unit rides the copy but still reads the identifier.
        let second = decoder.read_message().unwrap().unwrap();
        assert_eq!(second.name().name(), "Empty");
        assert_eq!(second.template_id(), Some(113));
        assert!(decoder.read_message().unwrap().is_none());
    }

    #[test]
    fn test_unknown_template_id() {
        let registry = Arc::new(BasicTemplateRegistry::new());
        let wire = bytes("11000000 11111111");
        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);

        let err = decoder.read_message().unwrap_err();
        assert!(matches!(
            err,
            FastError::Dynamic(DynError::UnknownTemplate(127))
        ));
    }

    #[test]
    fn test_missing_template_id() {
        let registry = registry_with(113, MessageTemplate::new("Empty"));
        let wire = bytes("10000000");
        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);

        let err = decoder.read_message().unwrap_err();
        assert!(matches!(
            err,
            FastError::Dynamic(DynError::MissingTemplateId)
        ));
    }

    #[test]
    fn test_eof_inside_a_unit_is_an_error() {
        let registry = registry_with(113, MessageTemplate::new("Empty"));
        let wire = bytes("11000000");
        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);

        let err = decoder.read_message().unwrap_err();
        assert!(matches!(
            err,
            FastError::Dynamic(DynError::UnexpectedEof)
        ));
    }

    fn decimal_template() -> MessageTemplate {
        MessageTemplate::new("Decimals")
            .with_field(Scalar::new("copy", FastType::Decimal, Operator::Copy, false))
            .with_field(Scalar::new("delta", FastType::Decimal, Operator::Delta, false))
            .with_field(Scalar::new("deltaopt", FastType::Decimal, Operator::Delta, true))
            .with_field(
                Scalar::new("deltabase", FastType::Decimal, Operator::Delta, false)
                    .with_initial_value(DecimalValue::new(123, -1)),
            )
            .with_field(
                Scalar::new("fixed", FastType::Decimal, Operator::Constant, false)
                    .with_initial_value(DecimalValue::new(234, -1)),
            )
            .with_field(
                Scalar::new("fallback", FastType::Decimal, Operator::Default, false)
                    .with_initial_value(DecimalValue::new(245, -1)),
            )
    }

    fn decimal_message(template: &Arc<MessageTemplate>) -> Message {
        let mut message = Message::new(Arc::clone(template));
        message.set("copy", decimal(12, -1)).unwrap();
        message.set("delta", decimal(23, -1)).unwrap();
        message.set("deltabase", decimal(45, -1)).unwrap();
        message.set("fixed", decimal(234, -1)).unwrap();
        message.set("fallback", decimal(245, -1)).unwrap();
        message
    }

    #[test]
    fn test_decimal_operators_across_a_stream() {
        let registry = registry_with(113, decimal_template());
        let template = registry.template_by_id(113).unwrap();

        let mut encoder = FastEncoder::new(Vec::new(), Arc::clone(&registry));
        encoder.write_message(&decimal_message(&template)).unwrap();

        let mut second = decimal_message(&template);
        second.set("delta", decimal(34, -1)).unwrap();
        second.set("deltabase", decimal(46, -1)).unwrap();
        encoder.write_message(&second).unwrap();

        let wire = encoder.into_inner();
        assert_eq!(
            wire,
            bytes(
                "11100000 11110001 11111111 10001100 11111111 10010111 \
                 10000000 10000000 01111111 10110010 \
                 10000000 10000000 10001011 10000000 10000000 10000001"
            )
        );

        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);
        let first = decoder.read_message().unwrap().unwrap();
        assert_eq!(first.scalar("copy"), Some(&decimal(12, -1)));
        assert_eq!(first.scalar("delta"), Some(&decimal(23, -1)));
        assert_eq!(first.get("deltaopt"), None);
        assert_eq!(first.scalar("deltabase"), Some(&decimal(45, -1)));
        assert_eq!(first.scalar("fixed"), Some(&decimal(234, -1)));
        assert_eq!(first.scalar("fallback"), Some(&decimal(245, -1)));

        let second_decoded = decoder.read_message().unwrap().unwrap();
        assert_eq!(second_decoded.scalar("copy"), Some(&decimal(12, -1)));
        assert_eq!(second_decoded.scalar("delta"), Some(&decimal(34, -1)));
        assert_eq!(second_decoded.scalar("deltabase"), Some(&decimal(46, -1)));
        assert_eq!(second_decoded, second);
        assert!(decoder.read_message().unwrap().is_none());
    }

    #[test]
    fn test_copy_rides_across_messages() {
        let template = MessageTemplate::new("Big")
            .with_field(Scalar::new("Volume", FastType::U64, Operator::Copy, false));
        let registry = registry_with(3, template);
        let template = registry.template_by_id(3).unwrap();

        let mut encoder = FastEncoder::new(Vec::new(), Arc::clone(&registry));
        for _ in 0..2 {
            let mut message = Message::new(Arc::clone(&template));
            message
                .set("Volume", ScalarValue::UInt64(10_000_000_000))
                .unwrap();
            encoder.write_message(&message).unwrap();
        }

        let wire = encoder.into_inner();
        assert_eq!(
            wire,
            bytes(
                "11100000 10000011 00100101 00100000 00101111 01001000 10000000 \
                 10000000"
            )
        );

        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);
        for _ in 0..2 {
            let message = decoder.read_message().unwrap().unwrap();
            assert_eq!(message.scalar("Volume"), Some(&ScalarValue::UInt64(10_000_000_000)));
        }
        assert!(decoder.read_message().unwrap().is_none());
    }

    #[test]
    fn test_string_delta_across_messages() {
        let template = MessageTemplate::new("Names")
            .with_field(Scalar::new("Sym", FastType::Ascii, Operator::Delta, false));
        let registry = registry_with(2, template);
        let template = registry.template_by_id(2).unwrap();

        let mut encoder = FastEncoder::new(Vec::new(), Arc::clone(&registry));
        for sym in ["DCB32", "DCB16"] {
            let mut message = Message::new(Arc::clone(&template));
            message.set("Sym", sym).unwrap();
            encoder.write_message(&message).unwrap();
        }

        let wire = encoder.into_inner();
        assert_eq!(
            wire,
            bytes(
                "11000000 10000010 10000000 01000100 01000011 01000010 00110011 10110010 \
                 10000000 10000010 00110001 10110110"
            )
        );

        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);
        assert_eq!(
            decoder.read_message().unwrap().unwrap().scalar("Sym"),
            Some(&ScalarValue::Ascii("DCB32".into()))
        );
        assert_eq!(
            decoder.read_message().unwrap().unwrap().scalar("Sym"),
            Some(&ScalarValue::Ascii("DCB16".into()))
        );
    }

    #[test]
    fn test_overflow_aborts_under_the_strict_handler() {
        let template = MessageTemplate::new("Narrow")
            .with_field(Scalar::new("N", FastType::U32, Operator::None, false))
            .with_field(Scalar::new("S", FastType::Ascii, Operator::None, false));
        let registry = registry_with(1, template);

        // N is 2^32, one past the last representable uInt32.
        let wire = bytes("11000000 10000001 00010000 00000000 00000000 00000000 10000000 11000001");
        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);
        let err = decoder.read_message().unwrap_err();
        assert!(matches!(
            err,
            FastError::Repr(RepError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_overflow_continues_under_a_lenient_handler() {
        let template = MessageTemplate::new("Narrow")
            .with_field(Scalar::new("N", FastType::U32, Operator::None, false))
            .with_field(Scalar::new("S", FastType::Ascii, Operator::None, false));
        let registry = registry_with(1, template);

        let wire = bytes("11000000 10000001 00010000 00000000 00000000 00000000 10000000 11000001");
        let context = Context::with_handler(Arc::new(LoggingErrorHandler));
        let mut decoder = FastDecoder::with_context(Cursor::new(wire), registry, context);

        let message = decoder.read_message().unwrap().unwrap();
        // The overflowed field falls back to the type's base value and the
        // rest of the unit still decodes.
        assert_eq!(message.scalar("N"), Some(&ScalarValue::UInt32(0)));
        assert_eq!(message.scalar("S"), Some(&ScalarValue::Ascii("A".into())));
        assert!(decoder.read_message().unwrap().is_none());
    }

    #[test]
    fn test_interleaved_templates_share_the_identifier_slot() {
        let mut registry = BasicTemplateRegistry::new();
        registry.register(1, MessageTemplate::new("A")).unwrap();
        registry.register(2, MessageTemplate::new("B")).unwrap();
        let registry: Arc<dyn TemplateRegistry> = Arc::new(registry);

        let a = registry.template_by_id(1).unwrap();
        let b = registry.template_by_id(2).unwrap();
        let mut encoder = FastEncoder::new(Vec::new(), Arc::clone(&registry));
        encoder.write_message(&Message::new(Arc::clone(&a))).unwrap();
        encoder.write_message(&Message::new(b)).unwrap();
        encoder.write_message(&Message::new(a)).unwrap();

        // Every switch retransmits the identifier.
        let wire = encoder.into_inner();
        assert_eq!(wire, bytes("11000000 10000001 11000000 10000010 11000000 10000001"));

        let mut decoder = FastDecoder::new(Cursor::new(wire), registry);
        assert_eq!(decoder.read_message().unwrap().unwrap().name().name(), "A");
        assert_eq!(decoder.read_message().unwrap().unwrap().name().name(), "B");
        assert_eq!(decoder.read_message().unwrap().unwrap().name().name(), "A");
    }
}
