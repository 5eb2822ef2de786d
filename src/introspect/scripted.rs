//! In-memory [`Introspector`]
//!
//! [`ScriptedProcess`] plays the role of a suspended debuggee whose state is
//! described up front with a small builder API. Tests use it to stage exact
//! scenarios; the demo host steps through a sequence of them.

use super::{
    FrameInfo, IntrospectionError, Introspector, ObjectId, ObjectState, Result, Target,
    ThreadInfo, Variable,
};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct ScriptedFrame {
    info: FrameInfo,
    variables: Vec<Variable>,
}

#[derive(Debug, Clone)]
struct ScriptedThread {
    info: ThreadInfo,
    /// Outermost call first
    frames: Vec<ScriptedFrame>,
}

#[derive(Debug, Clone)]
struct ScriptedTarget {
    target: Target,
    threads: Vec<ScriptedThread>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedProcess {
    targets: Vec<ScriptedTarget>,
    objects: FxHashMap<ObjectId, ObjectState>,
    unavailable: Option<String>,
    next_handle: u64,
}

impl ScriptedProcess {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Register a debug target and return its handle
    pub fn add_target(&mut self, name: &str) -> u64 {
        let handle = self.handle();
        self.targets.push(ScriptedTarget {
            target: Target {
                handle,
                name: name.to_string(),
            },
            threads: Vec::new(),
        });
        handle
    }

    /// Register a thread on `target` and return its handle
    pub fn add_thread(&mut self, target: u64, name: &str, is_system: bool) -> u64 {
        let handle = self.handle();
        let entry = self
            .targets
            .iter_mut()
            .find(|t| t.target.handle == target)
            .unwrap_or_else(|| panic!("Unknown scripted target {}", target));
        entry.threads.push(ScriptedThread {
            info: ThreadInfo {
                handle,
                name: name.to_string(),
                is_system,
            },
            frames: Vec::new(),
        });
        handle
    }

    /// Convenience: one target named `Main` with one user thread `main`
    pub fn with_main_thread() -> (Self, u64) {
        let mut process = Self::new();
        let target = process.add_target("Main");
        let thread = process.add_thread(target, "main", false);
        (process, thread)
    }

    /// Push a call onto `thread`; the last pushed frame is the active one
    pub fn push_frame(&mut self, thread: u64, mut info: FrameInfo, variables: Vec<Variable>) -> u64 {
        let handle = self.handle();
        info.handle = handle;
        self.thread_mut(thread)
            .frames
            .push(ScriptedFrame { info, variables });
        handle
    }

    /// Pop the active frame of `thread`
    pub fn pop_frame(&mut self, thread: u64) {
        self.thread_mut(thread).frames.pop();
    }

    /// Replace a variable of an existing frame (by name)
    pub fn set_variable(&mut self, frame: u64, variable: Variable) {
        let frame = self
            .targets
            .iter_mut()
            .flat_map(|t| t.threads.iter_mut())
            .flat_map(|t| t.frames.iter_mut())
            .find(|f| f.info.handle == frame)
            .unwrap_or_else(|| panic!("Unknown scripted frame {}", frame));
        match frame.variables.iter_mut().find(|v| v.name == variable.name) {
            Some(slot) => *slot = variable,
            None => frame.variables.push(variable),
        }
    }

    pub fn put_object(&mut self, id: ObjectId, state: ObjectState) {
        self.objects.insert(id, state);
    }

    pub fn remove_object(&mut self, id: ObjectId) {
        self.objects.remove(&id);
    }

    /// Make every query fail until cleared with `None`
    pub fn set_unavailable(&mut self, reason: Option<&str>) {
        self.unavailable = reason.map(str::to_string);
    }

    fn thread_mut(&mut self, thread: u64) -> &mut ScriptedThread {
        self.targets
            .iter_mut()
            .flat_map(|t| t.threads.iter_mut())
            .find(|t| t.info.handle == thread)
            .unwrap_or_else(|| panic!("Unknown scripted thread {}", thread))
    }

    fn check_available(&self) -> Result<()> {
        match &self.unavailable {
            Some(reason) => Err(IntrospectionError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Introspector for ScriptedProcess {
    fn targets(&self) -> Result<Vec<Target>> {
        self.check_available()?;
        Ok(self.targets.iter().map(|t| t.target.clone()).collect())
    }

    fn threads(&self, target: &Target) -> Result<Vec<ThreadInfo>> {
        self.check_available()?;
        let entry = self
            .targets
            .iter()
            .find(|t| t.target.handle == target.handle)
            .ok_or_else(|| IntrospectionError::TargetGone(target.name.clone()))?;
        Ok(entry.threads.iter().map(|t| t.info.clone()).collect())
    }

    fn frames(&self, thread: &ThreadInfo) -> Result<Vec<FrameInfo>> {
        self.check_available()?;
        let entry = self
            .targets
            .iter()
            .flat_map(|t| t.threads.iter())
            .find(|t| t.info.handle == thread.handle)
            .ok_or_else(|| IntrospectionError::ThreadNotSuspended(thread.name.clone()))?;
        Ok(entry.frames.iter().rev().map(|f| f.info.clone()).collect())
    }

    fn variables(&self, frame: &FrameInfo) -> Result<Vec<Variable>> {
        self.check_available()?;
        self.targets
            .iter()
            .flat_map(|t| t.threads.iter())
            .flat_map(|t| t.frames.iter())
            .find(|f| f.info.handle == frame.handle)
            .map(|f| f.variables.clone())
            .ok_or(IntrospectionError::InvalidFrame(frame.handle))
    }

    fn object(&self, id: ObjectId) -> Result<ObjectState> {
        self.check_available()?;
        self.objects
            .get(&id)
            .cloned()
            .ok_or(IntrospectionError::UnknownObject(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_listed_innermost_first() {
        let (mut process, thread) = ScriptedProcess::with_main_thread();
        process.push_frame(thread, FrameInfo::named("outer"), vec![]);
        process.push_frame(thread, FrameInfo::named("inner"), vec![]);

        let target = &process.targets().unwrap()[0];
        let threads = process.threads(target).unwrap();
        let frames = process.frames(&threads[0]).unwrap();
        let names: Vec<_> = frames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["inner", "outer"]);
    }

    #[test]
    fn test_unavailable_fails_every_query() {
        let (mut process, _) = ScriptedProcess::with_main_thread();
        process.set_unavailable(Some("vm disconnected"));
        assert!(matches!(
            process.targets(),
            Err(IntrospectionError::Unavailable(_))
        ));
        process.set_unavailable(None);
        assert_eq!(process.targets().unwrap().len(), 1);
    }

    #[test]
    fn test_set_variable_replaces_by_name() {
        let (mut process, thread) = ScriptedProcess::with_main_thread();
        let frame = process.push_frame(
            thread,
            FrameInfo::named("main"),
            vec![Variable::primitive("x", "int", "1")],
        );
        process.set_variable(frame, Variable::primitive("x", "int", "2"));
        process.set_variable(frame, Variable::primitive("y", "int", "3"));

        let mut info = FrameInfo::named("main");
        info.handle = frame;
        let vars = process.variables(&info).unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].value.display_string(), "2");
    }

    #[test]
    fn test_missing_object_is_reported() {
        let process = ScriptedProcess::new();
        assert_eq!(
            process.object(9),
            Err(IntrospectionError::UnknownObject(9))
        );
    }
}
