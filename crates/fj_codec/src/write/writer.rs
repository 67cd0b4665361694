use core::any::Any;
use core::fmt::Write;

use crate::error::{JsonError, JsonResult};
use crate::info::{DynamicKind, downcast_ref};
use crate::primitives::{date, guid, integer, text};
use crate::registry::{CodecId, CodecTable, EnumPlan, ObjectPlan, Plan};
use crate::settings::Settings;
use crate::value::{Dynamic, JsonValue, Number};
use crate::write::primitive::{write_f64, write_key, write_primitive};

/// The name of the discriminator member.
pub(crate) const TYPE_KEY: &str = "$type";

const INDENT: &str = "  ";

// -----------------------------------------------------------------------------
// Writer

/// Appends the JSON text of values to a `String`.
///
/// Obtained through [`CompiledCodec::write_into`](crate::registry::CompiledCodec::write_into)
/// and the functions built on it.
pub struct Writer<'a> {
    out: &'a mut String,
    table: &'a CodecTable,
    settings: &'a Settings,
    quote: char,
    depth: usize,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(out: &'a mut String, table: &'a CodecTable, settings: &'a Settings) -> Self {
        Self {
            out,
            table,
            quote: settings.write_quote(),
            settings,
            depth: 0,
        }
    }

    /// Appends `value` using the codec `id`.
    pub(crate) fn write(&mut self, id: CodecId, value: &dyn Any) -> JsonResult<()> {
        let table = self.table;
        match &table.get(id).plan {
            Plan::Primitive(kind) => write_primitive(self.out, *kind, value, self.settings),
            Plan::Enum(plan) => self.write_enum(plan, value),
            Plan::Nullable { inner, info } => match (info.get)(value)? {
                Some(inner_value) => self.write(*inner, inner_value),
                None => {
                    self.out.push_str("null");
                    Ok(())
                }
            },
            Plan::Boxed { inner, info } => self.write(*inner, (info.get)(value)?),
            Plan::Tuple { fields } => {
                self.open('[');
                for (index, (field_id, field)) in fields.iter().enumerate() {
                    self.entry(index);
                    self.write(*field_id, (field.get)(value)?)?;
                }
                self.close(']', !fields.is_empty());
                Ok(())
            }
            Plan::List { element, info } => {
                self.open('[');
                let mut len = 0;
                for item in (info.iter)(value)? {
                    self.entry(len);
                    self.write(*element, item)?;
                    len += 1;
                }
                self.close(']', len > 0);
                Ok(())
            }
            Plan::Dictionary {
                key,
                value: value_id,
                info,
            } => {
                self.open('{');
                let mut len = 0;
                for (k, v) in (info.iter)(value)? {
                    self.entry(len);
                    self.write_key(*key, k)?;
                    self.colon();
                    self.write(*value_id, v)?;
                    len += 1;
                }
                self.close('}', len > 0);
                Ok(())
            }
            Plan::Object(object) => self.write_object(object, value),
            Plan::Any(DynamicKind::Value) => self.write_value(downcast_ref::<JsonValue>(value)?),
            Plan::Any(DynamicKind::Dynamic) => self.write_dynamic(downcast_ref::<Dynamic>(value)?),
        }
    }

    // -------------------------------------------------------------------------
    // Layout

    fn open(&mut self, c: char) {
        self.out.push(c);
        self.depth += 1;
    }

    fn close(&mut self, c: char, non_empty: bool) {
        self.depth -= 1;
        if self.settings.pretty_print && non_empty {
            self.newline();
        }
        self.out.push(c);
    }

    /// Starts the `index`-th entry of an array or object.
    fn entry(&mut self, index: usize) {
        if index > 0 {
            self.out.push(',');
        }
        if self.settings.pretty_print {
            self.newline();
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn colon(&mut self) {
        self.out.push(':');
        if self.settings.pretty_print {
            self.out.push(' ');
        }
    }

    fn write_str(&mut self, s: &str) {
        text::write_escaped(self.out, s, self.quote);
    }

    // -------------------------------------------------------------------------
    // Shapes

    fn write_enum(&mut self, plan: &EnumPlan, value: &dyn Any) -> JsonResult<()> {
        let index = (plan.info.index_of)(value)?;
        let variant = plan.info.variants().get(index).ok_or_else(|| {
            JsonError::unsupported("enum", "the variant index is out of range")
        })?;
        if self.settings.enum_as_string {
            self.write_str(variant.name);
        } else {
            integer::write_i64(self.out, variant.value);
        }
        Ok(())
    }

    fn write_key(&mut self, id: CodecId, key: &dyn Any) -> JsonResult<()> {
        let table = self.table;
        let codec = table.get(id);
        match &codec.plan {
            Plan::Primitive(kind) => write_key(self.out, *kind, key, self.settings),
            Plan::Enum(plan) => {
                let index = (plan.info.index_of)(key)?;
                let variant = plan.info.variants().get(index).ok_or_else(|| {
                    JsonError::unsupported(codec.shape.type_name(), "the variant index is out of range")
                })?;
                if self.settings.enum_as_string {
                    self.write_str(variant.name);
                } else {
                    self.out.push(self.quote);
                    integer::write_i64(self.out, variant.value);
                    self.out.push(self.quote);
                }
                Ok(())
            }
            _ => Err(JsonError::unsupported(
                codec.shape.type_name(),
                "only primitives and enums can be dictionary keys",
            )),
        }
    }

    fn write_object(&mut self, object: &ObjectPlan, value: &dyn Any) -> JsonResult<()> {
        let table = self.table;
        let camel_case = self.settings.camel_case;
        let mut len = 0;

        self.open('{');
        if self.settings.include_type_discriminator {
            self.entry(len);
            self.write_str(TYPE_KEY);
            self.colon();
            self.write_str(object.type_name);
            len += 1;
        }
        for member in &object.members {
            let member_value = (member.info.get)(value)?;
            if self.settings.skip_defaults && table.get(member.codec).is_default(member_value)? {
                continue;
            }
            self.entry(len);
            self.write_str(member.wire_name(camel_case));
            self.colon();
            self.write(member.codec, member_value)?;
            len += 1;
        }
        self.close('}', len > 0);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Untyped values

    fn write_dynamic(&mut self, value: &Dynamic) -> JsonResult<()> {
        match value {
            Dynamic::Null => {
                self.out.push_str("null");
                Ok(())
            }
            Dynamic::Value(value) => self.write_value(value),
            Dynamic::Typed(boxed) => {
                let inner: &dyn Any = &**boxed;
                let id = self.table.id_of(inner.type_id()).ok_or_else(|| {
                    JsonError::unsupported(
                        "Dynamic",
                        "the held type has no codec, list it in the member's known types",
                    )
                })?;
                self.write(id, inner)
            }
        }
    }

    fn write_value(&mut self, value: &JsonValue) -> JsonResult<()> {
        match value {
            JsonValue::Null => self.out.push_str("null"),
            JsonValue::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            JsonValue::Number(Number::I32(n)) => integer::write_i64(self.out, (*n).into()),
            JsonValue::Number(Number::I64(n)) => integer::write_i64(self.out, *n),
            JsonValue::Number(Number::F64(x)) => write_f64(self.out, *x, self.quote),
            JsonValue::Number(Number::Decimal(d)) => {
                write!(self.out, "{d}").map_err(|_| {
                    JsonError::unsupported("decimal", "the value cannot be formatted")
                })?;
            }
            JsonValue::String(s) => self.write_str(s),
            JsonValue::DateTime(d) => {
                date::write_offset(self.out, d, self.settings).map_err(|_| {
                    JsonError::unsupported("date-time", "the value cannot be formatted")
                })?;
            }
            JsonValue::Guid(id) => {
                self.out.push(self.quote);
                guid::write(self.out, id);
                self.out.push(self.quote);
            }
            JsonValue::Array(items) => {
                self.open('[');
                for (index, item) in items.iter().enumerate() {
                    self.entry(index);
                    self.write_value(item)?;
                }
                self.close(']', !items.is_empty());
            }
            JsonValue::Object(map) => {
                self.open('{');
                for (index, (key, item)) in map.iter().enumerate() {
                    self.entry(index);
                    self.write_str(key);
                    self.colon();
                    self.write_value(item)?;
                }
                self.close('}', !map.is_empty());
            }
        }
        Ok(())
    }
}
