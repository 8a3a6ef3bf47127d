//! One-dimensional heat conduction with linear finite elements.
//!
//! `rho_c du/dt - d/dx(k(u) du/dx) = q` on `[0, L]`, discretized with `n`
//! two-node elements of size `h = L/n`:
//! - element stiffness `k_e/h * [[1, -1], [-1, 1]]`
//! - element mass `rho_c*h/6 * [[2, 1], [1, 2]]` (or lumped `rho_c*h/2`)
//! - element load `q*h/2 * [1, 1]`
//!
//! With `Conductivity::Linear` the element conductivity is evaluated at the
//! element-mean temperature of the current field values, so K changes every
//! nonlinear iteration.

use crate::common::{check_finite, check_positive};
use crate::constraint::{BoundaryValue, ConstraintSet, DirichletConstraint};
use crate::context::AssemblyContext;
use crate::error::{FormulationError, FormulationResult};
use crate::field::FieldSet;
use crate::traits::{Formulation, OperatorStore};
use bs_core::FieldId;
use nalgebra::{DMatrix, DVector};

/// Thermal conductivity law.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Conductivity {
    Constant(f64),
    /// `k(u) = k0 * (1 + beta * u)`
    Linear { k0: f64, beta: f64 },
}

impl Conductivity {
    pub fn at(&self, u: f64) -> f64 {
        match *self {
            Conductivity::Constant(k) => k,
            Conductivity::Linear { k0, beta } => k0 * (1.0 + beta * u),
        }
    }

    fn validate(&self) -> FormulationResult<()> {
        match *self {
            Conductivity::Constant(k) => check_positive(k, "conductivity"),
            Conductivity::Linear { k0, beta } => {
                check_positive(k0, "reference conductivity")?;
                check_finite(beta, "conductivity slope")
            }
        }
    }
}

/// Geometry, material and boundary data of a rod.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatRodParams {
    pub length: f64,
    pub elements: usize,
    /// Volumetric heat capacity `rho * c`.
    pub capacity: f64,
    pub conductivity: Conductivity,
    /// Uniform volumetric source.
    pub source: f64,
    pub lumped_mass: bool,
    /// Prescribed temperature at x = 0 (insulated when `None`).
    pub left: Option<BoundaryValue>,
    /// Prescribed temperature at x = L (insulated when `None`).
    pub right: Option<BoundaryValue>,
}

impl Default for HeatRodParams {
    fn default() -> Self {
        Self {
            length: 1.0,
            elements: 10,
            capacity: 1.0,
            conductivity: Conductivity::Constant(1.0),
            source: 0.0,
            lumped_mass: false,
            left: None,
            right: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HeatRod {
    params: HeatRodParams,
    temperature: FieldId,
    fields: FieldSet,
    constraints: ConstraintSet,
    store: OperatorStore,
}

impl HeatRod {
    pub fn new(params: HeatRodParams) -> FormulationResult<Self> {
        check_positive(params.length, "rod length")?;
        check_positive(params.capacity, "heat capacity")?;
        check_finite(params.source, "heat source")?;
        params.conductivity.validate()?;
        if params.elements == 0 {
            return Err(FormulationError::InvalidArg {
                what: "rod needs at least one element",
            });
        }

        let nodes = params.elements + 1;
        let fields = FieldSet::single("temperature", nodes)?;
        let temperature = fields
            .by_name("temperature")
            .map(|f| f.id())
            .ok_or(FormulationError::InvalidArg {
                what: "temperature field",
            })?;

        let mut constraints = Vec::new();
        if let Some(value) = params.left.clone() {
            constraints.push(DirichletConstraint { dof: 0, value });
        }
        if let Some(value) = params.right.clone() {
            constraints.push(DirichletConstraint {
                dof: nodes - 1,
                value,
            });
        }
        let constraints = ConstraintSet::from_constraints(nodes, constraints)?;

        Ok(Self {
            params,
            temperature,
            fields,
            constraints,
            store: OperatorStore::default(),
        })
    }

    pub fn params(&self) -> &HeatRodParams {
        &self.params
    }

    pub fn node_count(&self) -> usize {
        self.params.elements + 1
    }

    fn element_size(&self) -> f64 {
        self.params.length / self.params.elements as f64
    }

    /// Node coordinates from 0 to L.
    pub fn node_positions(&self) -> Vec<f64> {
        let h = self.element_size();
        (0..self.node_count()).map(|i| i as f64 * h).collect()
    }

    fn element_conductivity(&self, u: &DVector<f64>, e: usize) -> FormulationResult<f64> {
        let mean = 0.5 * (u[e] + u[e + 1]);
        let k = self.params.conductivity.at(mean);
        if !k.is_finite() || k <= 0.0 {
            tracing::warn!(element = e, mean, k, "non-positive conductivity");
            return Err(FormulationError::NonPhysical {
                what: "element conductivity",
            });
        }
        Ok(k)
    }
}

impl Formulation for HeatRod {
    fn name(&self) -> &str {
        "heat_rod"
    }

    fn fields(&self) -> &FieldSet {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldSet {
        &mut self.fields
    }

    fn clear_cache(&mut self) {
        self.store.clear();
    }

    fn assemble_stiffness(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        let n = self.node_count();
        let h = self.element_size();
        let u = self
            .fields
            .get(self.temperature)
            .map(|f| f.values().clone())
            .ok_or(FormulationError::InvalidArg {
                what: "temperature field",
            })?;

        let mut k = DMatrix::zeros(n, n);
        for e in 0..self.params.elements {
            let ke = self.element_conductivity(&u, e)? / h;
            k[(e, e)] += ke;
            k[(e, e + 1)] -= ke;
            k[(e + 1, e)] -= ke;
            k[(e + 1, e + 1)] += ke;
        }
        self.constraints.apply_to_stiffness(&mut k);
        self.store.set_stiffness(k);
        Ok(())
    }

    fn assemble_damping(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        let n = self.node_count();
        let h = self.element_size();
        let rho_c = self.params.capacity;

        let mut c = DMatrix::zeros(n, n);
        for e in 0..self.params.elements {
            if self.params.lumped_mass {
                c[(e, e)] += rho_c * h / 2.0;
                c[(e + 1, e + 1)] += rho_c * h / 2.0;
            } else {
                let m = rho_c * h / 6.0;
                c[(e, e)] += 2.0 * m;
                c[(e, e + 1)] += m;
                c[(e + 1, e)] += m;
                c[(e + 1, e + 1)] += 2.0 * m;
            }
        }
        self.constraints.apply_to_damping(&mut c);
        self.store.set_damping(c);
        Ok(())
    }

    fn assemble_rhs(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        let n = self.node_count();
        let half = self.params.source * self.element_size() / 2.0;

        let mut rhs = DVector::zeros(n);
        for e in 0..self.params.elements {
            rhs[e] += half;
            rhs[e + 1] += half;
        }
        self.constraints.apply_to_rhs(&mut rhs, ctx.time);
        self.store.set_rhs(rhs);
        Ok(())
    }

    fn refresh_rhs_constraints(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        let rhs = self.store.rhs_mut()?;
        self.constraints.apply_to_rhs(rhs, ctx.time);
        Ok(())
    }

    fn stiffness(&self) -> FormulationResult<&DMatrix<f64>> {
        self.store.stiffness()
    }

    fn damping(&self) -> FormulationResult<&DMatrix<f64>> {
        self.store.damping()
    }

    fn rhs(&self) -> FormulationResult<&DVector<f64>> {
        self.store.rhs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rod(conductivity: Conductivity) -> HeatRod {
        HeatRod::new(HeatRodParams {
            elements: 4,
            conductivity,
            left: Some(BoundaryValue::Constant(0.0)),
            right: Some(BoundaryValue::Constant(1.0)),
            ..HeatRodParams::default()
        })
        .unwrap()
    }

    #[test]
    fn mass_matrix_integrates_capacity() {
        for lumped in [false, true] {
            let mut r = HeatRod::new(HeatRodParams {
                elements: 5,
                capacity: 2.0,
                lumped_mass: lumped,
                ..HeatRodParams::default()
            })
            .unwrap();
            r.assemble_damping(&AssemblyContext::at_time(0.0)).unwrap();
            let total: f64 = r.damping().unwrap().iter().sum();
            assert!((total - 2.0).abs() < 1e-12, "lumped={lumped}");
        }
    }

    #[test]
    fn stiffness_rows_sum_to_zero_away_from_boundaries() {
        let mut r = rod(Conductivity::Constant(3.0));
        r.assemble_stiffness(&AssemblyContext::at_time(0.0)).unwrap();
        let k = r.stiffness().unwrap();
        for i in 1..4 {
            let sum: f64 = k.row(i).iter().sum();
            assert!(sum.abs() < 1e-12);
        }
        assert_eq!(k[(0, 0)], 1.0);
        assert_eq!(k[(4, 4)], 1.0);
        assert_eq!(k[(2, 2)], 2.0 * 3.0 / 0.25);
    }

    #[test]
    fn linear_conductivity_follows_field_values() {
        let mut r = rod(Conductivity::Linear { k0: 1.0, beta: 1.0 });
        let ctx = AssemblyContext::at_time(0.0);

        r.assemble_stiffness(&ctx).unwrap();
        let k_cold = r.stiffness().unwrap()[(2, 2)];

        r.fields_mut()
            .set_from_global(&DVector::from_element(5, 1.0))
            .unwrap();
        r.assemble_stiffness(&ctx).unwrap();
        let k_hot = r.stiffness().unwrap()[(2, 2)];

        assert!((k_hot - 2.0 * k_cold).abs() < 1e-12);
    }

    #[test]
    fn negative_conductivity_is_non_physical() {
        let mut r = rod(Conductivity::Linear { k0: 1.0, beta: 1.0 });
        r.fields_mut()
            .set_from_global(&DVector::from_element(5, -2.0))
            .unwrap();
        let err = r
            .assemble_stiffness(&AssemblyContext::at_time(0.0))
            .unwrap_err();
        assert!(matches!(err, FormulationError::NonPhysical { .. }));
    }

    #[test]
    fn source_load_sums_to_total_heat() {
        let mut r = HeatRod::new(HeatRodParams {
            elements: 8,
            length: 2.0,
            source: 3.0,
            ..HeatRodParams::default()
        })
        .unwrap();
        r.assemble_rhs(&AssemblyContext::at_time(0.0)).unwrap();
        let total: f64 = r.rhs().unwrap().iter().sum();
        assert!((total - 6.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let err = HeatRod::new(HeatRodParams {
            elements: 0,
            ..HeatRodParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, FormulationError::InvalidArg { .. }));
        assert!(
            HeatRod::new(HeatRodParams {
                length: -1.0,
                ..HeatRodParams::default()
            })
            .is_err()
        );
    }
}
