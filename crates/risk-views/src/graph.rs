//! Explicit dependency graph between controls and computed outputs.
//!
//! Each binding declares the controls it reads and the controls it may write.
//! On a control change only the bindings reading a changed control run, each
//! at most once per event. Control-writing bindings run first so that the
//! values they cascade are visible to every downstream binding.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::controls::{ControlError, ControlId, ControlState, ControlValue, OutputId};

/// Values of a binding's declared inputs.
pub struct Inputs<'a> {
    declared: &'a [ControlId],
    values: Vec<ControlValue>,
}

impl<'a> Inputs<'a> {
    fn collect(declared: &'a [ControlId], state: &ControlState) -> Self {
        Self {
            declared,
            values: declared.iter().map(|id| state.get(*id)).collect(),
        }
    }

    pub fn get(&self, id: ControlId) -> Option<&ControlValue> {
        let position = self.declared.iter().position(|d| *d == id);
        debug_assert!(position.is_some(), "binding read undeclared control {id}");
        position.map(|i| &self.values[i])
    }

    /// Text value of a single-select control, `None` when unset or undeclared.
    pub fn text(&self, id: ControlId) -> Option<&str> {
        match self.get(id) {
            Some(ControlValue::Text(Some(v))) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn list(&self, id: ControlId) -> &[String] {
        match self.get(id) {
            Some(ControlValue::List(v)) => v,
            _ => &[],
        }
    }

    pub fn flag(&self, id: ControlId) -> bool {
        matches!(self.get(id), Some(ControlValue::Flag(true)))
    }
}

/// What a binding produced in one run.
#[derive(Debug, Clone)]
pub struct Emission<Out> {
    pub outputs: Vec<(OutputId, Out)>,
    pub writes: Vec<(ControlId, ControlValue)>,
}

impl<Out> Default for Emission<Out> {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            writes: Vec::new(),
        }
    }
}

impl<Out> Emission<Out> {
    pub fn output(mut self, id: OutputId, value: Out) -> Self {
        self.outputs.push((id, value));
        self
    }

    pub fn write(mut self, id: ControlId, value: ControlValue) -> Self {
        self.writes.push((id, value));
        self
    }
}

/// Result of one recomputation pass, ready to push to the browser.
#[derive(Debug, Clone, Serialize)]
pub struct Update<Out> {
    pub outputs: BTreeMap<OutputId, Out>,
    /// Control values written by cascading bindings
    pub controls: BTreeMap<ControlId, ControlValue>,
    /// Names of the bindings that ran, in execution order
    pub recomputed: Vec<&'static str>,
}

impl<Out> Default for Update<Out> {
    fn default() -> Self {
        Self {
            outputs: BTreeMap::new(),
            controls: BTreeMap::new(),
            recomputed: Vec::new(),
        }
    }
}

impl<Out> Update<Out> {
    pub fn is_empty(&self) -> bool {
        self.recomputed.is_empty()
    }
}

type Compute<Ctx, Out> = Box<dyn Fn(&Ctx, &Inputs<'_>) -> Emission<Out> + Send + Sync>;

struct Binding<Ctx, Out> {
    name: &'static str,
    inputs: Vec<ControlId>,
    writes: Vec<ControlId>,
    compute: Compute<Ctx, Out>,
}

impl<Ctx, Out> Binding<Ctx, Out> {
    fn reads_any(&self, changed: &BTreeSet<ControlId>) -> bool {
        self.inputs.iter().any(|c| changed.contains(c))
    }

    fn writes_controls(&self) -> bool {
        !self.writes.is_empty()
    }
}

/// Registry of bindings over a shared, read-only context `Ctx`.
pub struct ViewGraph<Ctx, Out> {
    bindings: Vec<Binding<Ctx, Out>>,
}

impl<Ctx, Out> Default for ViewGraph<Ctx, Out> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<Ctx, Out> ViewGraph<Ctx, Out> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding. `writes` lists every control the compute function
    /// may emit a write for; writes to other controls are ignored.
    pub fn bind<F>(
        mut self,
        name: &'static str,
        inputs: &[ControlId],
        writes: &[ControlId],
        compute: F,
    ) -> Self
    where
        F: Fn(&Ctx, &Inputs<'_>) -> Emission<Out> + Send + Sync + 'static,
    {
        self.bindings.push(Binding {
            name,
            inputs: inputs.to_vec(),
            writes: writes.to_vec(),
            compute: Box::new(compute),
        });
        self
    }

    /// Names of the bindings that read `control`, in registration order.
    pub fn dependents(&self, control: ControlId) -> Vec<&'static str> {
        self.bindings
            .iter()
            .filter(|b| b.inputs.contains(&control))
            .map(|b| b.name)
            .collect()
    }

    pub fn binding_names(&self) -> Vec<&'static str> {
        self.bindings.iter().map(|b| b.name).collect()
    }

    /// Run every binding once, control writers first.
    pub fn render_all(&self, ctx: &Ctx, state: &mut ControlState) -> Result<Update<Out>, ControlError> {
        self.propagate(ctx, state, ControlId::ALL.into_iter().collect(), true)
    }

    /// Write one control and recompute what depends on it.
    ///
    /// An unchanged value recomputes nothing. A rejected value leaves the
    /// state untouched.
    pub fn apply(
        &self,
        ctx: &Ctx,
        state: &mut ControlState,
        control: ControlId,
        value: ControlValue,
    ) -> Result<Update<Out>, ControlError> {
        if !state.set(control, value)? {
            return Ok(Update::default());
        }
        self.propagate(ctx, state, BTreeSet::from([control]), false)
    }

    fn propagate(
        &self,
        ctx: &Ctx,
        state: &mut ControlState,
        mut changed: BTreeSet<ControlId>,
        run_all: bool,
    ) -> Result<Update<Out>, ControlError> {
        let mut update = Update::default();
        let mut done = vec![false; self.bindings.len()];
        let due = |b: &Binding<Ctx, Out>, changed: &BTreeSet<ControlId>| run_all || b.reads_any(changed);

        // writers until the cascade settles
        while let Some(idx) = self
            .bindings
            .iter()
            .enumerate()
            .position(|(i, b)| !done[i] && b.writes_controls() && due(b, &changed))
        {
            done[idx] = true;
            let binding = &self.bindings[idx];
            let emission = self.run(binding, ctx, state, &mut update);

            for (id, value) in emission.writes {
                if !binding.writes.contains(&id) {
                    tracing::warn!("Binding {} wrote undeclared control {}", binding.name, id);
                    continue;
                }
                if state.set(id, value.clone())? {
                    changed.insert(id);
                }
                update.controls.insert(id, value);
            }
            update.outputs.extend(emission.outputs);
        }

        for (idx, binding) in self.bindings.iter().enumerate() {
            if done[idx] || binding.writes_controls() || !due(binding, &changed) {
                continue;
            }
            let emission = self.run(binding, ctx, state, &mut update);
            update.outputs.extend(emission.outputs);
        }

        Ok(update)
    }

    fn run(
        &self,
        binding: &Binding<Ctx, Out>,
        ctx: &Ctx,
        state: &ControlState,
        update: &mut Update<Out>,
    ) -> Emission<Out> {
        tracing::trace!("Recomputing {}", binding.name);
        update.recomputed.push(binding.name);
        let inputs = Inputs::collect(&binding.inputs, state);
        (binding.compute)(ctx, &inputs)
    }
}
