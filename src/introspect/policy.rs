//! Backend-specific conventions
//!
//! Some debuggers smuggle the value most recently returned into the active
//! frame as a pseudo local. Which variable that is (if any) depends on the
//! backend, so the scene asks a [`ReturnValuePolicy`] instead of assuming.

use super::Variable;

/// Name the JDT backend gives the return slot when nothing was returned yet
pub const NO_RETURN_VALUE: &str = "no method return value";

/// Splits the active frame's variables into locals and a return value
pub trait ReturnValuePolicy {
    /// Remove the return-value slot from `variables` (if the backend puts one
    /// there) and return it when it should be displayed.
    fn take_return_value(&self, variables: &mut Vec<Variable>) -> Option<Variable>;
}

/// The first local of the active frame is the return value of the most
/// recent call. Placeholder slots and `void` results are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLocalIsReturnValue;

impl ReturnValuePolicy for FirstLocalIsReturnValue {
    fn take_return_value(&self, variables: &mut Vec<Variable>) -> Option<Variable> {
        if variables.is_empty() {
            return None;
        }
        let slot = variables.remove(0);
        if slot.name == NO_RETURN_VALUE || slot.declared_type == "void" {
            None
        } else {
            Some(slot)
        }
    }
}

/// For backends that never report return values
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReturnValue;

impl ReturnValuePolicy for NoReturnValue {
    fn take_return_value(&self, _variables: &mut Vec<Variable>) -> Option<Variable> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_local_is_split_off() {
        let mut vars = vec![
            Variable::primitive("size() returned", "int", "3"),
            Variable::primitive("x", "int", "1"),
        ];
        let ret = FirstLocalIsReturnValue.take_return_value(&mut vars);
        assert_eq!(ret.map(|v| v.name), Some("size() returned".to_string()));
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "x");
    }

    #[test]
    fn test_placeholder_and_void_are_dropped() {
        let mut vars = vec![
            Variable::primitive(NO_RETURN_VALUE, "", ""),
            Variable::primitive("x", "int", "1"),
        ];
        assert!(FirstLocalIsReturnValue
            .take_return_value(&mut vars)
            .is_none());
        assert_eq!(vars.len(), 1);

        let mut vars = vec![Variable::primitive("run() returned", "void", "")];
        assert!(FirstLocalIsReturnValue
            .take_return_value(&mut vars)
            .is_none());
        assert!(vars.is_empty());
    }

    #[test]
    fn test_no_return_value_keeps_locals() {
        let mut vars = vec![Variable::primitive("x", "int", "1")];
        assert!(NoReturnValue.take_return_value(&mut vars).is_none());
        assert_eq!(vars.len(), 1);
    }
}
