//! Linear undo history with grouped transactions.

/// A reversible edit against some context.
///
/// `apply` may record state it displaces (for example an occupant it replaced)
/// so that `revert` can restore it; both take `&mut self` for that reason.
pub trait Command<Ctx> {
    fn apply(&mut self, ctx: &mut Ctx);
    fn revert(&mut self, ctx: &mut Ctx);
}

#[derive(Debug, Clone)]
enum Entry<C> {
    Single(C),
    Group(Vec<C>),
}

impl<C> Entry<C> {
    fn apply<Ctx>(&mut self, ctx: &mut Ctx)
    where
        C: Command<Ctx>,
    {
        match self {
            Entry::Single(c) => c.apply(ctx),
            Entry::Group(cs) => cs.iter_mut().for_each(|c| c.apply(ctx)),
        }
    }

    fn revert<Ctx>(&mut self, ctx: &mut Ctx)
    where
        C: Command<Ctx>,
    {
        match self {
            Entry::Single(c) => c.revert(ctx),
            Entry::Group(cs) => cs.iter_mut().rev().for_each(|c| c.revert(ctx)),
        }
    }

    fn into_commands(self) -> Vec<C> {
        match self {
            Entry::Single(c) => vec![c],
            Entry::Group(cs) => cs,
        }
    }
}

/// Entries before `cursor` are applied, entries at or after it are not.
#[derive(Debug, Clone)]
pub struct CommandStack<C> {
    entries: Vec<Entry<C>>,
    cursor: usize,
    group_start: Option<usize>,
}

impl<C> Default for CommandStack<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            group_start: None,
        }
    }
}

impl<C> CommandStack<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the redo tail, applies `cmd` and records it.
    pub fn push_and_execute<Ctx>(&mut self, mut cmd: C, ctx: &mut Ctx)
    where
        C: Command<Ctx>,
    {
        self.entries.truncate(self.cursor);
        cmd.apply(ctx);
        self.entries.push(Entry::Single(cmd));
        self.cursor = self.entries.len();
    }

    pub fn undo<Ctx>(&mut self, ctx: &mut Ctx) -> bool
    where
        C: Command<Ctx>,
    {
        self.close_open_group();
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.entries[self.cursor].revert(ctx);
        true
    }

    pub fn redo<Ctx>(&mut self, ctx: &mut Ctx) -> bool
    where
        C: Command<Ctx>,
    {
        self.close_open_group();
        if self.cursor >= self.entries.len() {
            return false;
        }
        self.entries[self.cursor].apply(ctx);
        self.cursor += 1;
        true
    }

    /// Starts collecting pushes into one undo step.
    pub fn begin_group(&mut self) -> bool {
        if self.group_start.is_some() {
            log::error!(target: "edit", "begin_group called while a group is already open");
            return false;
        }
        self.group_start = Some(self.cursor);
        true
    }

    /// Folds everything pushed since `begin_group` into a single entry.
    ///
    /// Only applied entries are folded. A group with no pushes leaves the redo tail alone.
    pub fn end_group(&mut self) -> bool {
        let Some(start) = self.group_start.take() else {
            log::error!(target: "edit", "end_group called without an open group");
            return false;
        };
        let end = self.cursor;
        let start = start.min(end);
        let commands: Vec<C> = self
            .entries
            .drain(start..end)
            .flat_map(Entry::into_commands)
            .collect();
        if commands.is_empty() {
            self.cursor = start;
        } else {
            log::debug!(target: "edit", "grouped {} commands", commands.len());
            self.entries.insert(start, Entry::Group(commands));
            self.cursor = start + 1;
        }
        true
    }

    #[inline]
    pub fn is_group_open(&self) -> bool {
        self.group_start.is_some()
    }

    fn close_open_group(&mut self) {
        if self.group_start.is_some() {
            self.end_group();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.group_start = None;
    }

    /// Number of undo steps recorded, counting a group as one.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }
}
