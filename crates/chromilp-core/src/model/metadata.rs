//! Variable and constraint naming.

use chromilp_expr::ids::{ConstraintId, VariableId};
use std::collections::BTreeMap;

use super::Model;
use super::error::ModelError;

impl Model {
    /// Attach a human-readable name to a variable.
    pub fn set_variable_name(
        &mut self,
        id: VariableId,
        name: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.ensure_variable_exists(id)?;
        self.variable_names
            .get_or_insert_with(BTreeMap::new)
            .insert(id, name.into());
        Ok(())
    }

    /// Attach a human-readable name to a constraint.
    pub fn set_constraint_name(
        &mut self,
        id: ConstraintId,
        name: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.ensure_constraint_exists(id)?;
        self.constraint_names
            .get_or_insert_with(BTreeMap::new)
            .insert(id, name.into());
        Ok(())
    }

    pub fn variable_name(&self, id: VariableId) -> Option<&str> {
        self.variable_names.as_ref()?.get(&id).map(String::as_str)
    }

    pub fn constraint_name(&self, id: ConstraintId) -> Option<&str> {
        self.constraint_names.as_ref()?.get(&id).map(String::as_str)
    }

    /// Look a variable up by name.
    pub fn variable_by_name(&self, name: &str) -> Option<VariableId> {
        self.variable_names
            .as_ref()?
            .iter()
            .find_map(|(id, stored)| (stored == name).then_some(*id))
    }

    /// Look a constraint up by name.
    pub fn constraint_by_name(&self, name: &str) -> Option<ConstraintId> {
        self.constraint_names
            .as_ref()?
            .iter()
            .find_map(|(id, stored)| (stored == name).then_some(*id))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Model, ModelError};
    use crate::types::{Bounds, Constraint, Variable};
    use chromilp_expr::ids::VariableId;

    #[test]
    fn names_are_lazy_and_roundtrip() {
        let mut model = Model::new();
        let x = model.add_variable(Variable::binary()).unwrap();
        assert!(model.variable_name(x).is_none());

        model.set_variable_name(x, "used[1]").unwrap();
        assert_eq!(model.variable_name(x), Some("used[1]"));
        assert_eq!(model.variable_by_name("used[1]"), Some(x));
        assert_eq!(model.variable_by_name("used[2]"), None);

        let c = model
            .add_constraint(Constraint { bounds: Bounds::fixed(1.0) })
            .unwrap();
        model.set_constraint_name(c, "assign[3]").unwrap();
        assert_eq!(model.constraint_name(c), Some("assign[3]"));
        assert_eq!(model.constraint_by_name("assign[3]"), Some(c));
        assert_eq!(model.constraint_by_name("assign[4]"), None);
    }

    #[test]
    fn naming_unknown_variable_fails() {
        let mut model = Model::new();
        let result = model.set_variable_name(VariableId::new(0), "x");
        assert_eq!(result, Err(ModelError::InvalidVariableId(VariableId::new(0))));
    }
}
