//! State variables backed by slices of the global state vector.

use crate::error::{FormulationError, FormulationResult};
use bs_core::FieldId;
use nalgebra::{DVector, DVectorView};

/// One named unknown of the system.
///
/// A field owns the values of its degrees of freedom, which occupy the
/// contiguous range `offset..offset + len` of the global state vector.
#[derive(Clone, Debug)]
pub struct Field {
    id: FieldId,
    name: String,
    offset: usize,
    values: DVector<f64>,
}

impl Field {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    /// This field's slice of a global vector.
    pub fn project<'a>(&self, global: &'a DVector<f64>) -> FormulationResult<DVectorView<'a, f64>> {
        let end = self.offset + self.len();
        if global.len() < end {
            return Err(FormulationError::DimensionMismatch {
                what: "global vector",
                expected: end,
                actual: global.len(),
            });
        }
        Ok(global.rows(self.offset, self.len()))
    }

    /// Overwrite the field values with its slice of `global`.
    pub fn set_from_global(&mut self, global: &DVector<f64>) -> FormulationResult<()> {
        let slice = self.project(global)?.clone_owned();
        self.values = slice;
        Ok(())
    }

    /// Write the field values into their slice of `global`.
    pub fn write_to_global(&self, global: &mut DVector<f64>) -> FormulationResult<()> {
        let end = self.offset + self.len();
        if global.len() < end {
            return Err(FormulationError::DimensionMismatch {
                what: "global vector",
                expected: end,
                actual: global.len(),
            });
        }
        global.rows_mut(self.offset, self.len()).copy_from(&self.values);
        Ok(())
    }
}

/// Ordered collection of the fields of one formulation.
#[derive(Clone, Debug, Default)]
pub struct FieldSet {
    fields: Vec<Field>,
    dofs: usize,
}

impl FieldSet {
    /// Lay out fields back to back in the order given, all values zero.
    pub fn new<S: Into<String>>(layout: impl IntoIterator<Item = (S, usize)>) -> FormulationResult<Self> {
        let mut fields = Vec::new();
        let mut offset = 0;
        for (index, (name, len)) in layout.into_iter().enumerate() {
            if len == 0 {
                return Err(FormulationError::InvalidArg {
                    what: "field with zero degrees of freedom",
                });
            }
            let id = u32::try_from(index)
                .ok()
                .and_then(FieldId::from_index)
                .ok_or(FormulationError::InvalidArg {
                    what: "too many fields",
                })?;
            fields.push(Field {
                id,
                name: name.into(),
                offset,
                values: DVector::zeros(len),
            });
            offset += len;
        }
        if fields.is_empty() {
            return Err(FormulationError::InvalidArg {
                what: "formulation without fields",
            });
        }
        Ok(Self {
            fields,
            dofs: offset,
        })
    }

    /// A single field spanning all `dofs` degrees of freedom.
    pub fn single(name: &str, dofs: usize) -> FormulationResult<Self> {
        Self::new([(name, dofs)])
    }

    /// Total number of degrees of freedom over all fields.
    pub fn dof_count(&self) -> usize {
        self.dofs
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.index() as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Broadcast a global state vector into every field.
    pub fn set_from_global(&mut self, global: &DVector<f64>) -> FormulationResult<()> {
        if global.len() != self.dofs {
            return Err(FormulationError::DimensionMismatch {
                what: "global state",
                expected: self.dofs,
                actual: global.len(),
            });
        }
        for field in &mut self.fields {
            field.set_from_global(global)?;
        }
        Ok(())
    }

    /// Concatenate the field values back into a global vector.
    pub fn gather(&self) -> FormulationResult<DVector<f64>> {
        let mut global = DVector::zeros(self.dofs);
        for field in &self.fields {
            field.write_to_global(&mut global)?;
        }
        Ok(global)
    }
}
