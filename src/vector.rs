use crate::datatypes::{DataType, DecodeError, EncodeError, Value};
use crate::registers::Schema;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("{label} snapshot carries {actual} registers, the schema expects {expected}")]
    LengthMismatch { label: &'static str, expected: usize, actual: usize },
    #[error("could not decode field {index} ({name})")]
    Entry {
        index: usize,
        name: &'static str,
        #[source]
        source: DecodeError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum AccessError {
    #[error("the {schema} schema has no field {index}")]
    IndexNotFound { schema: &'static str, index: usize },
    #[error("the {schema} schema has no field named {name:?}")]
    NameNotFound { schema: &'static str, name: String },
}

#[derive(thiserror::Error, Debug)]
pub enum SetError {
    #[error(transparent)]
    NotFound(#[from] AccessError),
    #[error("field {name} holds {} values, not {found}", .expected.kind_name())]
    TypeMismatch { name: &'static str, expected: DataType, found: &'static str },
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("could not encode field {index} ({name})")]
    Entry {
        index: usize,
        name: &'static str,
        #[source]
        source: EncodeError,
    },
}

/// One field of a loaded vector.
#[derive(Clone, Copy, Debug)]
pub struct Entry<'v> {
    pub index: usize,
    pub name: &'static str,
    pub data_type: DataType,
    pub value: &'v Value,
}

/// One decoded snapshot: a schema bound to concrete register values.
///
/// A vector is created by [`DataVector::load`] and discarded with the
/// snapshot; a fresh exchange with the controller produces a fresh vector
/// rather than mutating this one in place.
pub struct DataVector<'s> {
    schema: &'s Schema,
    values: Vec<Value>,
}

impl<'s> DataVector<'s> {
    /// Decode a raw register sequence against the schema.
    ///
    /// All-or-nothing: a length mismatch (protocol desynchronization or
    /// firmware schema drift) or any per-field decode failure aborts the
    /// whole load, so a vector never exposes partial data.
    pub fn load(schema: &'s Schema, raw: &[i32]) -> Result<Self, LoadError> {
        if raw.len() != schema.register_count() {
            return Err(LoadError::LengthMismatch {
                label: schema.label(),
                expected: schema.register_count(),
                actual: raw.len(),
            });
        }
        let mut values = Vec::with_capacity(schema.len());
        let mut cursor = 0;
        for (index, field) in schema.fields().iter().enumerate() {
            let window = &raw[cursor..cursor + field.data_type.registers()];
            let value = field
                .data_type
                .decode(window)
                .map_err(|source| LoadError::Entry { index, name: field.name, source })?;
            values.push(value);
            cursor += field.data_type.registers();
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn get(&self, index: usize) -> Result<Entry<'_>, AccessError> {
        let field = self.schema.field(index).ok_or(AccessError::IndexNotFound {
            schema: self.schema.label(),
            index,
        })?;
        Ok(Entry { index, name: field.name, data_type: field.data_type, value: &self.values[index] })
    }

    pub fn get_named(&self, name: &str) -> Result<Entry<'_>, AccessError> {
        let index = self.index_named(name)?;
        self.get(index)
    }

    /// Replace one field's value ahead of re-encoding.
    ///
    /// The value must have the shape the field's kind decodes to; on a
    /// mismatch the vector is left untouched.
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), SetError> {
        let field = *self.schema.field(index).ok_or(AccessError::IndexNotFound {
            schema: self.schema.label(),
            index,
        })?;
        if !field.data_type.matches(&value) {
            return Err(SetError::TypeMismatch {
                name: field.name,
                expected: field.data_type,
                found: value.kind_name(),
            });
        }
        self.values[index] = value;
        Ok(())
    }

    pub fn set_named(&mut self, name: &str, value: Value) -> Result<(), SetError> {
        let index = self.index_named(name)?;
        self.set(index, value)
    }

    /// Re-encode the current values into a raw register sequence in schema
    /// order, for handoff to the write side of the protocol.
    pub fn export(&self) -> Result<Vec<i32>, ExportError> {
        let mut raw = Vec::with_capacity(self.schema.register_count());
        for entry in self.iter() {
            let registers = entry
                .data_type
                .encode(entry.value)
                .map_err(|source| ExportError::Entry { index: entry.index, name: entry.name, source })?;
            raw.extend(registers);
        }
        Ok(raw)
    }

    /// Display string for one field. Cannot fail for a present field: every
    /// value renders, at worst as its raw number.
    pub fn format(&self, index: usize) -> Result<String, AccessError> {
        Ok(self.get(index)?.value.to_string())
    }

    pub fn format_named(&self, name: &str) -> Result<String, AccessError> {
        Ok(self.get_named(name)?.value.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = Entry<'_>> {
        std::iter::zip(self.schema.fields(), &self.values).enumerate().map(
            |(index, (field, value))| Entry {
                index,
                name: field.name,
                data_type: field.data_type,
                value,
            },
        )
    }

    fn index_named(&self, name: &str) -> Result<usize, AccessError> {
        self.schema.index_of(name).ok_or_else(|| AccessError::NameNotFound {
            schema: self.schema.label(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::LazyLock;

    use super::*;
    use crate::datatypes::Coded;
    use crate::registers::{CALCULATIONS, CALCULATIONS_REGISTERS, Field};

    static HEATING: LazyLock<Schema> = LazyLock::new(|| {
        Schema::writable(
            "heating",
            vec![
                Field { name: "ID_Einst_WK_akt", data_type: DataType::Celsius },
                Field { name: "ID_Einst_BWS_akt", data_type: DataType::Celsius },
                Field { name: "ID_Ba_Hz_akt", data_type: DataType::Bool },
                Field { name: "ID_Einst_Zeit", data_type: DataType::Seconds },
            ],
        )
        .unwrap()
    });

    #[test]
    fn load_rejects_wrong_lengths() {
        for len in [0, 3, 5] {
            let raw = vec![0; len];
            assert!(matches!(
                DataVector::load(&HEATING, &raw),
                Err(LoadError::LengthMismatch { label: "heating", expected: 4, actual }) if actual == len,
            ));
        }
    }

    #[test]
    fn one_bad_register_aborts_the_whole_load() {
        // 7 is not a valid flag value for the third field.
        let result = DataVector::load(&HEATING, &[251, 508, 7, 60]);
        assert!(matches!(
            result,
            Err(LoadError::Entry { index: 2, name: "ID_Ba_Hz_akt", .. }),
        ));
    }

    #[test]
    fn loaded_vectors_cover_exactly_the_schema() {
        let vector = DataVector::load(&HEATING, &[251, 508, 1, 60]).unwrap();
        for index in 0..HEATING.len() {
            assert!(vector.get(index).is_ok());
        }
        assert!(matches!(
            vector.get(HEATING.len()),
            Err(AccessError::IndexNotFound { schema: "heating", index }) if index == HEATING.len(),
        ));
        assert_eq!(vector.get(0).unwrap().value, &Value::Celsius(25.1));
        assert_eq!(vector.get_named("ID_Einst_BWS_akt").unwrap().value, &Value::Celsius(50.8));
        assert!(matches!(
            vector.get_named("ID_No_Such_Field"),
            Err(AccessError::NameNotFound { schema: "heating", .. }),
        ));
    }

    #[test]
    fn set_validates_the_value_shape() {
        let mut vector = DataVector::load(&HEATING, &[251, 508, 1, 60]).unwrap();
        vector.set_named("ID_Einst_WK_akt", Value::Celsius(22.0)).unwrap();
        assert_eq!(vector.get(0).unwrap().value, &Value::Celsius(22.0));

        let error = vector.set_named("ID_Einst_WK_akt", Value::Bool(false)).unwrap_err();
        assert!(matches!(
            error,
            SetError::TypeMismatch { name: "ID_Einst_WK_akt", expected: DataType::Celsius, found: "bool" },
        ));
        // The rejected write left the previous value in place.
        assert_eq!(vector.get(0).unwrap().value, &Value::Celsius(22.0));
    }

    #[test]
    fn export_inverts_load() {
        let raw = [251, 508, 1, 60];
        let mut vector = DataVector::load(&HEATING, &raw).unwrap();
        assert_eq!(vector.export().unwrap(), raw);

        vector.set_named("ID_Ba_Hz_akt", Value::Bool(false)).unwrap();
        assert_eq!(vector.export().unwrap(), [251, 508, 0, 60]);
    }

    #[test]
    fn export_surfaces_one_directional_fields() {
        let raw = vec![0; CALCULATIONS_REGISTERS];
        let vector = DataVector::load(&CALCULATIONS, &raw).unwrap();
        let version = CALCULATIONS.index_of("ID_WEB_SoftStand").unwrap();
        assert!(matches!(
            vector.export(),
            Err(ExportError::Entry { index, name: "ID_WEB_SoftStand", .. }) if index == version,
        ));
    }

    #[test]
    fn a_full_calculation_snapshot_decodes() {
        let mut raw = vec![0i32; CALCULATIONS_REGISTERS];
        raw[10] = 237; // flow temperature, tenths of a degree
        raw[15] = -45; // outside temperature
        raw[44] = 1; // compressor 1 running
        raw[63] = 3602; // heat pump operating seconds
        raw[80] = 2; // operating mode
        for (offset, byte) in "V3.86.0".bytes().enumerate() {
            raw[81 + offset] = i32::from(byte);
        }
        raw[91] = 0xC0A80101u32 as i32; // controller address
        raw[95] = 1675000000; // first error timestamp
        raw[100] = 717; // first error code
        raw[257] = 8450; // heat output, W

        let vector = DataVector::load(&CALCULATIONS, &raw).unwrap();
        assert_eq!(
            vector.get_named("ID_WEB_Temperatur_TVL").unwrap().value,
            &Value::Celsius(23.7),
        );
        assert_eq!(
            vector.get_named("ID_WEB_Temperatur_TA").unwrap().value,
            &Value::Celsius(-4.5),
        );
        assert_eq!(vector.get_named("ID_WEB_VD1out").unwrap().value, &Value::Bool(true));
        assert_eq!(vector.format_named("ID_WEB_Zaehler_BetrZeitWP").unwrap(), "1h 2s");
        assert_eq!(
            vector.get_named("ID_WEB_WP_BZ_akt").unwrap().value,
            &Value::OperationMode(Coded { code: 2, label: Some("swimming pool/solar") }),
        );
        assert_eq!(
            vector.get_named("ID_WEB_SoftStand").unwrap().value,
            &Value::Version("V3.86.0".into()),
        );
        assert_eq!(
            vector.get_named("ID_WEB_AdresseIP_akt").unwrap().value,
            &Value::IPv4Address(Ipv4Addr::new(192, 168, 1, 1)),
        );
        assert_eq!(vector.format_named("ID_WEB_ERROR_Nr0").unwrap(), "flow rate");
        assert_eq!(vector.format_named("ID_WEB_ERROR_Time1").unwrap(), "never");
        assert_eq!(vector.get_named("Heat_Output").unwrap().value, &Value::Power(8450.0));
        // Unclassified fields pass through verbatim.
        assert_eq!(vector.get_named("Unknown_Calculation_0").unwrap().value, &Value::Unknown(0));
    }

    #[test]
    fn format_falls_back_to_the_raw_number() {
        let vector = DataVector::load(&HEATING, &[251, 508, 1, 60]).unwrap();
        assert_eq!(vector.format(0).unwrap(), "25.1 °C");
        assert!(matches!(vector.format(99), Err(AccessError::IndexNotFound { .. })));
    }
}
