//! List traversal over cons chains.
//!
//! A list is either [`Value::Null`] or a chain of pairs whose final cdr is
//! `Null`. Anything else encountered where a continuation was expected is a
//! malformed list. Traversal does not detect cycles; a chain made circular
//! through `set-cdr!` iterates indefinitely, matching the engine contract.

use std::rc::Rc;

use crate::error::SkiffError;
use crate::value::{Pair, Value};

/// Visit every cell of a list in order, passing `(index, pair)` so callers
/// can mutate through the cell. If the callback fails and the current cell
/// has a recorded span, the error is location-prefixed before propagating.
pub fn each_pair<F>(list: &Value, mut f: F) -> Result<(), SkiffError>
where
    F: FnMut(usize, &Rc<Pair>) -> Result<(), SkiffError>,
{
    let mut cell = match list {
        Value::Null => return Ok(()),
        Value::Pair(p) => Rc::clone(p),
        _ => return Err(SkiffError::InvalidList),
    };
    let mut idx = 0;
    loop {
        if let Err(err) = f(idx, &cell) {
            return Err(match cell.location() {
                Some(span) => err.at(span),
                None => err,
            });
        }
        match cell.cdr() {
            Value::Pair(next) => cell = next,
            Value::Null => return Ok(()),
            _ => return Err(SkiffError::InvalidList),
        }
        idx += 1;
    }
}

/// Visit every element of a list in order, passing `(index, element)`.
pub fn each_element<F>(list: &Value, mut f: F) -> Result<(), SkiffError>
where
    F: FnMut(usize, &Value) -> Result<(), SkiffError>,
{
    each_pair(list, |idx, pair| f(idx, &pair.car()))
}

/// Length of a proper list; fails with the invalid-list error otherwise.
pub fn list_length(list: &Value) -> Result<usize, SkiffError> {
    let mut count = 0;
    each_element(list, |_, _| {
        count += 1;
        Ok(())
    })?;
    Ok(count)
}

/// Whether the value is a proper list. Never errors.
pub fn is_list(list: &Value) -> bool {
    list_length(list).is_ok()
}

/// Materialize the elements of a proper list in order.
pub fn list_to_vec(list: &Value) -> Result<Vec<Value>, SkiffError> {
    let mut items = Vec::new();
    each_element(list, |_, v| {
        items.push(v.clone());
        Ok(())
    })?;
    Ok(items)
}

/// Materialize the cells of a proper list in order.
pub fn pairs_to_vec(list: &Value) -> Result<Vec<Rc<Pair>>, SkiffError> {
    let mut cells = Vec::new();
    each_pair(list, |_, p| {
        cells.push(Rc::clone(p));
        Ok(())
    })?;
    Ok(cells)
}

/// Build a list from a slice by consing right-to-left; the empty slice
/// yields `Null`.
pub fn list_from(items: &[Value]) -> Value {
    let mut result = Value::Null;
    for item in items.iter().rev() {
        result = Value::cons(item.clone(), result);
    }
    result
}
