use core::any::Any;

use log::warn;

use crate::error::{JsonError, JsonResult};
use crate::info::{BoxedValue, DynamicKind, SeqFill, downcast_mut};
use crate::read::Cursor;
use crate::read::primitive::{parse_primitive, parse_variant};
use crate::registry::{CodecId, CodecTable, EnumPlan, ObjectPlan, Plan};
use crate::settings::Settings;
use crate::value::infer::{infer_number, infer_string};
use crate::value::{Dynamic, JsonMap, JsonValue};
use crate::write::TYPE_KEY;

/// Arrays and objects may nest this deep before reading fails.
pub(crate) const MAX_DEPTH: usize = 128;

/// Consumes a string or a bare scalar, telling which it was.
fn token<'a: 's, 's>(
    cursor: &mut Cursor<'a>,
    settings: &Settings,
    scratch: &'s mut String,
) -> JsonResult<(&'s str, bool)> {
    cursor.skip_whitespace();
    match cursor.peek() {
        Some(q) if settings.is_quote(q) => Ok((cursor.string(settings, scratch)?, true)),
        _ => Ok((cursor.bare_token()?, false)),
    }
}

// -----------------------------------------------------------------------------
// Reader

/// Decodes JSON text into existing values, driven by compiled codecs.
pub(crate) struct Reader<'a, 't> {
    cursor: Cursor<'a>,
    table: &'t CodecTable,
    settings: &'t Settings,
    scratch: String,
    depth: usize,
}

impl<'a, 't> Reader<'a, 't> {
    pub(crate) fn new(
        cursor: Cursor<'a>,
        table: &'t CodecTable,
        settings: &'t Settings,
        scratch: String,
    ) -> Self {
        Self {
            cursor,
            table,
            settings,
            scratch,
            depth: 0,
        }
    }

    #[inline]
    pub(crate) fn cursor(&self) -> Cursor<'a> {
        self.cursor
    }

    pub(crate) fn into_scratch(self) -> String {
        self.scratch
    }

    /// Fails unless only whitespace remains.
    pub(crate) fn finish(&mut self) -> JsonResult<()> {
        self.cursor.skip_whitespace();
        match self.cursor.peek() {
            None => Ok(()),
            Some(_) => Err(self.cursor.error("unexpected text after the value")),
        }
    }

    /// Reads one value into `target` using the codec `id`.
    pub(crate) fn read(&mut self, id: CodecId, target: &mut dyn Any) -> JsonResult<()> {
        if self.cursor.eat_null() {
            return self.read_null(id, target);
        }
        let table = self.table;
        match &table.get(id).plan {
            Plan::Tuple { .. } | Plan::List { .. } | Plan::Dictionary { .. } | Plan::Object(_) => {
                self.nested(|reader| reader.read_plan(id, target))
            }
            _ => self.read_plan(id, target),
        }
    }

    fn read_plan(&mut self, id: CodecId, target: &mut dyn Any) -> JsonResult<()> {
        let table = self.table;
        let codec = table.get(id);
        match &codec.plan {
            Plan::Primitive(kind) => {
                let settings = self.settings;
                let start = self.cursor.position();
                let (text, quoted) = token(&mut self.cursor, settings, &mut self.scratch)?;
                if parse_primitive(*kind, text, quoted, target, settings)? {
                    Ok(())
                } else {
                    Err(JsonError::conversion(kind.name(), text, start))
                }
            }
            Plan::Enum(plan) => self.read_enum(plan, codec.shape.type_name(), target),
            Plan::Nullable { inner, info } => self.read(*inner, (info.insert_default)(target)?),
            Plan::Boxed { inner, info } => self.read(*inner, (info.get_mut)(target)?),
            Plan::Tuple { fields } => {
                let start = self.cursor;
                self.cursor.expect(b'[')?;
                for (index, (field_id, field)) in fields.iter().enumerate() {
                    if index > 0 && !self.cursor.eat(b',') {
                        return Err(self.mismatch(codec.shape.type_name(), start));
                    }
                    self.cursor.skip_whitespace();
                    if self.cursor.peek() == Some(b']') {
                        return Err(self.mismatch(codec.shape.type_name(), start));
                    }
                    self.read(*field_id, (field.get_mut)(target)?)?;
                }
                if self.cursor.eat(b']') {
                    Ok(())
                } else {
                    Err(self.mismatch(codec.shape.type_name(), start))
                }
            }
            Plan::List { element, info } => {
                let start = self.cursor;
                match &info.fill {
                    SeqFill::InPlace {
                        clear,
                        push_default,
                    } => {
                        clear(target)?;
                        self.elements(|reader| reader.read(*element, push_default(&mut *target)?))?;
                        Ok(())
                    }
                    SeqFill::Collect { len, assign } => {
                        let descriptor = table.get(*element).descriptor();
                        let mut items = Vec::new();
                        self.elements(|reader| {
                            let mut item = descriptor.new_default();
                            reader.read(*element, &mut *item)?;
                            items.push(item);
                            Ok(())
                        })?;
                        if len.is_some_and(|len| len != items.len()) {
                            return Err(self.mismatch(codec.shape.type_name(), start));
                        }
                        assign(target, items)
                    }
                }
            }
            Plan::Dictionary {
                key,
                value: value_id,
                info,
            } => {
                (info.clear)(target)?;
                self.cursor.expect(b'{')?;
                if self.cursor.eat(b'}') {
                    return Ok(());
                }
                loop {
                    let key_value = self.read_key(*key)?;
                    self.cursor.expect(b':')?;
                    self.read(*value_id, (info.insert)(target, key_value)?)?;
                    if !self.cursor.eat(b',') {
                        return self.cursor.expect(b'}');
                    }
                }
            }
            Plan::Object(object) => self.read_object(object, target),
            Plan::Any(DynamicKind::Value) => {
                *downcast_mut::<JsonValue>(target)? = self.read_value()?;
                Ok(())
            }
            Plan::Any(DynamicKind::Dynamic) => self.read_dynamic(target),
        }
    }

    /// Applies a `null` token to `target`.
    ///
    /// Only nullable wrappers, variable-length collections and untyped
    /// values react. Everything else keeps its current value.
    fn read_null(&mut self, id: CodecId, target: &mut dyn Any) -> JsonResult<()> {
        let table = self.table;
        match &table.get(id).plan {
            Plan::Nullable { info, .. } => (info.clear)(target),
            Plan::Boxed { inner, info } => self.read_null(*inner, (info.get_mut)(target)?),
            Plan::List { info, .. } => match &info.fill {
                SeqFill::InPlace { clear, .. } => clear(target),
                SeqFill::Collect { len: None, assign } => assign(target, Vec::new()),
                SeqFill::Collect { len: Some(_), .. } => Ok(()),
            },
            Plan::Dictionary { info, .. } => (info.clear)(target),
            Plan::Any(DynamicKind::Value) => {
                *downcast_mut::<JsonValue>(target)? = JsonValue::Null;
                Ok(())
            }
            Plan::Any(DynamicKind::Dynamic) => {
                *downcast_mut::<Dynamic>(target)? = Dynamic::Null;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Runs `f` one array or object level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> JsonResult<T>) -> JsonResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.cursor.error("nesting too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // -------------------------------------------------------------------------
    // Tokens

    /// Rewinds to `start`, skips the whole value and reports it as
    /// unconvertible.
    #[cold]
    fn mismatch(&mut self, expected: &'static str, start: Cursor<'a>) -> JsonError {
        self.cursor = start;
        if self.cursor.skip_value(self.settings).is_err() {
            self.cursor = start;
        }
        let len = self.cursor.position() - start.position();
        let text = &start.rest()[..len];
        JsonError::conversion(expected, text.trim_start(), start.position())
    }

    /// Reads `[a, b, ...]`, calling `each` once per element.
    fn elements(
        &mut self,
        mut each: impl FnMut(&mut Self) -> JsonResult<()>,
    ) -> JsonResult<()> {
        self.cursor.expect(b'[')?;
        if self.cursor.eat(b']') {
            return Ok(());
        }
        loop {
            each(self)?;
            if !self.cursor.eat(b',') {
                return self.cursor.expect(b']');
            }
        }
    }

    // -------------------------------------------------------------------------
    // Shapes

    fn read_enum(
        &mut self,
        plan: &EnumPlan,
        type_name: &'static str,
        target: &mut dyn Any,
    ) -> JsonResult<()> {
        let start = self.cursor.position();
        let case_sensitive = self.settings.case_sensitive;
        let (text, _) = token(&mut self.cursor, self.settings, &mut self.scratch)?;
        match parse_variant(plan.info, text, case_sensitive) {
            Some(index) => (plan.info.set_index)(target, index),
            None => Err(JsonError::conversion(type_name, text, start)),
        }
    }

    /// Reads a dictionary key into a fresh instance of the key type.
    fn read_key(&mut self, id: CodecId) -> JsonResult<BoxedValue> {
        let codec = self.table.get(id);
        let mut key = codec.descriptor().new_default();

        self.cursor.skip_whitespace();
        let start = self.cursor.position();
        let text = self.cursor.string(self.settings, &mut self.scratch)?;
        let converted = match &codec.plan {
            Plan::Primitive(kind) => parse_primitive(*kind, text, true, &mut *key, self.settings)?,
            Plan::Enum(plan) => match parse_variant(plan.info, text, self.settings.case_sensitive) {
                Some(index) => {
                    (plan.info.set_index)(&mut *key, index)?;
                    true
                }
                None => false,
            },
            _ => {
                return Err(JsonError::unsupported(
                    codec.shape.type_name(),
                    "only primitives and enums can be dictionary keys",
                ));
            }
        };
        if converted {
            Ok(key)
        } else {
            Err(JsonError::conversion(codec.shape.type_name(), text, start))
        }
    }

    fn read_object(&mut self, object: &ObjectPlan, target: &mut dyn Any) -> JsonResult<()> {
        let camel_case = self.settings.camel_case;
        let case_sensitive = self.settings.case_sensitive;

        self.cursor.expect(b'{')?;
        if self.cursor.eat(b'}') {
            return Ok(());
        }
        loop {
            self.cursor.skip_whitespace();
            let name = self.cursor.string(self.settings, &mut self.scratch)?;
            // First declared member wins when names differ only by case.
            let found = object.members.iter().find(|member| {
                let wire = member.wire_name(camel_case);
                if case_sensitive {
                    wire == name
                } else {
                    wire.eq_ignore_ascii_case(name)
                }
            });
            self.cursor.expect(b':')?;
            match found {
                Some(member) => self.read(member.codec, (member.info.get_mut)(target)?)?,
                None => self.cursor.skip_value(self.settings)?,
            }
            if !self.cursor.eat(b',') {
                return self.cursor.expect(b'}');
            }
        }
    }

    // -------------------------------------------------------------------------
    // Untyped values

    /// Reads any value into the untyped model, inferring scalar types.
    fn read_value(&mut self) -> JsonResult<JsonValue> {
        self.cursor.skip_whitespace();
        match self.cursor.peek() {
            Some(b'{') => self.nested(Self::read_map),
            Some(b'[') => self.nested(|reader| {
                let mut items = Vec::new();
                reader.elements(|reader| {
                    items.push(reader.read_value()?);
                    Ok(())
                })?;
                Ok(JsonValue::Array(items))
            }),
            Some(q) if self.settings.is_quote(q) => {
                let text = self.cursor.string(self.settings, &mut self.scratch)?;
                Ok(infer_string(text, self.settings))
            }
            Some(_) => {
                let start = self.cursor.position();
                match self.cursor.bare_token()? {
                    "null" => Ok(JsonValue::Null),
                    "true" => Ok(JsonValue::Bool(true)),
                    "false" => Ok(JsonValue::Bool(false)),
                    token => infer_number(token)
                        .map(JsonValue::Number)
                        .ok_or_else(|| JsonError::conversion("number", token, start)),
                }
            }
            None => Err(self.cursor.error("expected a value")),
        }
    }

    fn read_map(&mut self) -> JsonResult<JsonValue> {
        self.cursor.expect(b'{')?;
        let mut map = JsonMap::default();
        if self.cursor.eat(b'}') {
            return Ok(JsonValue::Object(map));
        }
        loop {
            self.cursor.skip_whitespace();
            let key = self.cursor.string(self.settings, &mut self.scratch)?.to_owned();
            self.cursor.expect(b':')?;
            let value = self.read_value()?;
            map.insert(key, value);
            if !self.cursor.eat(b',') {
                self.cursor.expect(b'}')?;
                return Ok(JsonValue::Object(map));
            }
        }
    }

    fn read_dynamic(&mut self, target: &mut dyn Any) -> JsonResult<()> {
        self.cursor.skip_whitespace();
        let value = match self.discriminated_type()? {
            Some(id) => {
                let mut value = self.table.get(id).descriptor().new_default();
                self.read(id, &mut *value)?;
                Dynamic::Typed(value)
            }
            None => Dynamic::Value(self.read_value()?),
        };
        *downcast_mut::<Dynamic>(target)? = value;
        Ok(())
    }

    /// Looks ahead for a leading `"$type": "name"` and resolves the name.
    ///
    /// The cursor is left where it was.
    fn discriminated_type(&mut self) -> JsonResult<Option<CodecId>> {
        if self.cursor.peek() != Some(b'{') {
            return Ok(None);
        }
        let mark = self.cursor;
        self.cursor.bump();
        self.cursor.skip_whitespace();

        let mut found = None;
        if self.cursor.peek().is_some_and(|q| self.settings.is_quote(q)) {
            let is_type_key = self.cursor.string(self.settings, &mut self.scratch)? == TYPE_KEY;
            if is_type_key && self.cursor.eat(b':') {
                self.cursor.skip_whitespace();
                if self.cursor.peek().is_some_and(|q| self.settings.is_quote(q)) {
                    let name = self.cursor.string(self.settings, &mut self.scratch)?;
                    found = self.table.id_by_name(name);
                    if found.is_none() {
                        warn!("`{TYPE_KEY}` names unknown type `{name}`, reading an untyped value");
                    }
                }
            }
        }
        self.cursor = mark;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use crate::Json;
    use crate::registry::CodecRegistry;
    use crate::settings::{QuoteChar, Settings};
    use crate::value::JsonValue;

    #[derive(Json, Default, Debug, PartialEq)]
    pub struct Point {
        pub x: i32,
        pub y: i32,
    }

    #[derive(Json, Default, Debug, PartialEq, Clone, Copy, Eq, Hash, PartialOrd, Ord)]
    pub enum Color {
        #[default]
        Red,
        Green,
        Blue = 7,
    }

    #[derive(Json, Default, Debug, PartialEq)]
    pub struct Paint {
        pub color: Color,
        pub alpha: f32,
    }

    fn read<T: crate::JsonType>(text: &str, settings: &Settings) -> crate::JsonResult<T> {
        CodecRegistry::new().deserialize::<T>(text, settings)
    }

    #[test]
    fn unknown_members_are_skipped() {
        let text = r#"{"x":1,"extra":{"a":[1,"}",{"b":null}]},"y":2,"z":[]}"#;
        let point: Point = read(text, &Settings::default()).unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn nested_dictionaries() {
        let text = r#"{"All":{"ym":"ss"}}"#;
        let value: HashMap<String, HashMap<String, String>> =
            read(text, &Settings::default()).unwrap();
        assert_eq!(value["All"]["ym"], "ss");

        let any = CodecRegistry::new()
            .deserialize_any(text, &Settings::default())
            .unwrap();
        assert_eq!(any.get("All").and_then(|all| all.get("ym")).and_then(JsonValue::as_str), Some("ss"));
    }

    #[test]
    fn null_elements() {
        let s = Settings::default();
        let values: Vec<Option<i32>> = read("[1, null, 3]", &s).unwrap();
        assert_eq!(values, vec![Some(1), None, Some(3)]);

        let values: Vec<i32> = read("[1,null,3]", &s).unwrap();
        assert_eq!(values, vec![1, 0, 3]);

        let values: Vec<String> = read(r#"["a",null]"#, &s).unwrap();
        assert_eq!(values, vec!["a".to_owned(), String::new()]);
    }

    #[test]
    fn null_leaves_plain_values_alone() {
        let registry = CodecRegistry::new();
        let codec = registry.codec::<Point>().unwrap();
        let s = Settings::default();

        let mut point = Point { x: 5, y: 6 };
        codec.read_into(r#"{"x":null,"y":1}"#, &mut point, &s).unwrap();
        assert_eq!(point, Point { x: 5, y: 1 });

        codec.read_into("null", &mut point, &s).unwrap();
        assert_eq!(point, Point { x: 5, y: 1 });
    }

    #[test]
    fn envelope() {
        let s = Settings::default();
        assert!(read::<Point>("", &s).unwrap_err().is_invalid_json());
        assert!(read::<Point>("[1,2]", &s).unwrap_err().is_invalid_json());
        assert!(read::<Point>(r#"{"x":1"#, &s).unwrap_err().is_invalid_json());
        assert!(read::<Vec<i32>>(r#"{"x":1}"#, &s).unwrap_err().is_invalid_json());
        assert!(read::<Vec<i32>>("[1] [2]", &s).unwrap_err().is_invalid_json());
        assert!(read::<i32>("1 2", &s).unwrap_err().is_invalid_json());
        assert_eq!(read::<Vec<i32>>(" \n[1]\t", &s).unwrap(), vec![1]);
    }

    #[test]
    fn malformed_inner_text() {
        let s = Settings::default();
        assert!(read::<Point>(r#"{"x" 1}"#, &s).unwrap_err().is_invalid_json());
        assert!(read::<Point>(r#"{x:1}"#, &s).unwrap_err().is_invalid_json());
        assert!(read::<Vec<i32>>("[1 2]", &s).unwrap_err().is_invalid_json());
        assert!(read::<Vec<String>>(r#"["abc]"#, &s).unwrap_err().is_invalid_json());
    }

    #[test]
    fn conversions() {
        let s = Settings::default();
        assert_eq!(read::<Point>(r#"{"x":"12","y":-3}"#, &s).unwrap(), Point { x: 12, y: -3 });

        let err = read::<Point>(r#"{"x":1.5}"#, &s).unwrap_err();
        assert!(err.is_conversion(), "{err}");
        assert!(read::<u8>("300", &s).unwrap_err().is_conversion());
        assert!(read::<String>("12", &s).unwrap_err().is_conversion());
        assert!(read::<bool>("yes", &s).unwrap_err().is_conversion());
    }

    #[test]
    fn enums_by_name_or_number() {
        let s = Settings::default();
        let paint: Paint = read(r#"{"color":"Blue","alpha":1}"#, &s).unwrap();
        assert_eq!(paint.color, Color::Blue);
        let paint: Paint = read(r#"{"color":7}"#, &s).unwrap();
        assert_eq!(paint.color, Color::Blue);
        assert!(read::<Paint>(r#"{"color":"green"}"#, &s).unwrap_err().is_conversion());

        let loose = Settings::default().with_case_sensitive(false);
        let paint: Paint = read(r#"{"color":"green"}"#, &loose).unwrap();
        assert_eq!(paint.color, Color::Green);
        assert!(read::<Paint>(r#"{"color":3}"#, &s).unwrap_err().is_conversion());
    }

    #[test]
    fn member_name_matching() {
        let loose = Settings::default().with_case_sensitive(false);
        let point: Point = read(r#"{"X":1,"Y":2}"#, &loose).unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });

        let strict = Settings::default();
        let point: Point = read(r#"{"X":1,"y":2}"#, &strict).unwrap();
        assert_eq!(point, Point { x: 0, y: 2 });
    }

    #[test]
    fn camel_case_names() {
        #[derive(Json, Default, Debug, PartialEq)]
        pub struct Record {
            #[json(rename = "UserName")]
            pub user_name: String,
        }

        let s = Settings::default().with_camel_case(true);
        let record: Record = read(r#"{"userName":"ann"}"#, &s).unwrap();
        assert_eq!(record.user_name, "ann");

        let record: Record = read(r#"{"UserName":"ann"}"#, &s).unwrap();
        assert_eq!(record.user_name, "");
    }

    #[test]
    fn fixed_arrays_and_tuples() {
        let s = Settings::default();
        assert_eq!(read::<[u8; 3]>("[1,2,3]", &s).unwrap(), [1, 2, 3]);
        assert!(read::<[u8; 3]>("[1,2]", &s).unwrap_err().is_conversion());
        assert_eq!(read::<(i32, String)>(r#"[1,"a"]"#, &s).unwrap(), (1, "a".to_owned()));

        let err = read::<(i32, String)>(r#"[1,"a",true]"#, &s).unwrap_err();
        assert!(err.is_conversion(), "{err}");
        assert!(read::<(i32, String)>("[1]", &s).unwrap_err().is_conversion());
    }

    #[test]
    fn dictionary_keys() {
        let s = Settings::default();
        let map: BTreeMap<i32, bool> = read(r#"{"1":true,"-2":false}"#, &s).unwrap();
        assert_eq!(map, BTreeMap::from([(1, true), (-2, false)]));

        let map: BTreeMap<Color, i32> = read(r#"{"Green":1,"7":2}"#, &s).unwrap();
        assert_eq!(map, BTreeMap::from([(Color::Green, 1), (Color::Blue, 2)]));

        assert!(read::<BTreeMap<i32, bool>>(r#"{"a":true}"#, &s).unwrap_err().is_conversion());
    }

    #[test]
    fn single_quotes() {
        let s = Settings::default().with_quote_char(QuoteChar::Single);
        let map: HashMap<String, String> = read("{'a':'it\\'s'}", &s).unwrap();
        assert_eq!(map["a"], "it's");
    }

    #[test]
    fn untyped_values() {
        let s = Settings::default();
        let value: JsonValue = read(r#"[true,null,12,"x",{"k":[]}]"#, &s).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0], JsonValue::Bool(true));
        assert!(items[1].is_null());
        assert_eq!(items[2].as_i64(), Some(12));
        assert_eq!(items[3].as_str(), Some("x"));
        assert_eq!(items[4].get("k"), Some(&JsonValue::Array(Vec::new())));

        assert!(read::<JsonValue>("[nope]", &s).unwrap_err().is_conversion());
    }

    #[test]
    fn nesting_depth_is_limited() {
        let s = Settings::default();
        let deep = |depth: usize| "[".repeat(depth) + &"]".repeat(depth);

        let registry = CodecRegistry::new();
        let err = registry.deserialize_any(&deep(100_000), &s).unwrap_err();
        assert!(err.is_invalid_json(), "{err}");
        assert!(read::<Vec<JsonValue>>(&deep(100_000), &s).unwrap_err().is_invalid_json());

        let objects = r#"{"a":"#.repeat(100_000) + "1" + &"}".repeat(100_000);
        assert!(registry.deserialize_any(&objects, &s).unwrap_err().is_invalid_json());

        let value = registry.deserialize_any(&deep(super::MAX_DEPTH), &s).unwrap();
        assert!(value.as_array().is_some());
        assert!(registry.deserialize_any(&deep(super::MAX_DEPTH + 1), &s).is_err());
        assert_eq!(read::<Vec<Vec<Vec<i32>>>>("[[[1]]]", &s).unwrap(), vec![vec![vec![1]]]);

        // Skipped members are walked without recursion.
        let text = format!(r#"{{"x":1,"extra":{},"y":2}}"#, deep(100_000));
        assert_eq!(read::<Point>(&text, &s).unwrap(), Point { x: 1, y: 2 });
    }
}
