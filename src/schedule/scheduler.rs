use std::collections::{BTreeMap, BTreeSet};

use crate::{
    animation::tree::{AnimationNode, PlannedNode, child_delay, children_base, plan_subtree},
    animation::variant::{Lerp, VariantKey, VisualStyle},
    foundation::core::{Millis, NodeId},
    foundation::error::{RevealError, RevealResult},
    schedule::timer::TimerQueue,
};

/// Runtime state of one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Showing (or returning to) the hidden variant.
    Hidden,
    /// Entrance scheduled or in progress.
    Animating,
    /// Entrance finished.
    Visible,
}

/// Scheduler-owned bookkeeping for one node.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ActivationRecord {
    /// Node identifier.
    pub node: NodeId,
    /// Parent identifier (`None` for the root).
    pub parent: Option<NodeId>,
    /// Current state.
    pub state: NodeState,
    /// Offset of the node's entrance from the start of an epoch.
    pub effective_delay: Millis,
    /// Whether an entrance command for this node was ever delivered.
    pub has_fired_once: bool,
    /// Epoch in which the node's entrance was last scheduled.
    pub scheduled_epoch: Option<u64>,
    /// When the current entrance began, once delivered.
    pub started_at: Option<Millis>,
    // Reversal start time and the style it started from.
    #[serde(skip)]
    reversed_from: Option<(Millis, VisualStyle)>,
}

/// Instruction to move one node to a variant after a delay.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ActivationCommand {
    /// Target node.
    pub node: NodeId,
    /// Variant to move to.
    pub target: VariantKey,
    /// Delay relative to the moment the command was issued.
    pub delay: Millis,
}

/// A command whose deferred time has arrived.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FiredActivation {
    /// Target node.
    pub node: NodeId,
    /// Variant to move to.
    pub target: VariantKey,
    /// Time the command was due.
    pub at: Millis,
}

#[derive(Clone, Debug)]
struct Pending {
    node: NodeId,
    target: VariantKey,
}

/// Drives a variant tree from hidden to visible as a visibility signal flips.
///
/// `schedule` plans commands for a signal value; `advance` delivers the ones whose
/// time has come. Every command, including zero-delay ones, passes through the
/// scheduler's timer queue, so cancellation covers all of them.
#[derive(Debug)]
pub struct StaggerScheduler {
    tree: AnimationNode,
    records: BTreeMap<NodeId, ActivationRecord>,
    timers: TimerQueue<Pending>,
    epoch: u64,
    epoch_started: Option<Millis>,
    now: Millis,
    torn_down: bool,
}

impl StaggerScheduler {
    /// Validate `tree` and create hidden records for every node.
    pub fn new(tree: AnimationNode) -> RevealResult<Self> {
        tree.validate()?;
        let mut records = BTreeMap::new();
        for planned in tree.plan() {
            records.insert(planned.id.clone(), hidden_record(planned));
        }
        Ok(Self {
            tree,
            records,
            timers: TimerQueue::new(),
            epoch: 0,
            epoch_started: None,
            now: Millis::ZERO,
            torn_down: false,
        })
    }

    /// Tree being driven.
    pub fn tree(&self) -> &AnimationNode {
        &self.tree
    }

    /// Record of one node.
    pub fn record(&self, id: &NodeId) -> Option<&ActivationRecord> {
        self.records.get(id)
    }

    /// All records, keyed by node id.
    pub fn records(&self) -> impl Iterator<Item = &ActivationRecord> {
        self.records.values()
    }

    /// Number of visibility epochs started so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Latest time passed to `schedule`, `advance` or `insert_child`.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Whether the driving signal is currently true.
    pub fn is_active(&self) -> bool {
        self.epoch_started.is_some()
    }

    /// Whether [`teardown`](Self::teardown) ran.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Number of commands waiting for their time.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Earliest time at which [`advance`](Self::advance) has something to deliver.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// React to the current value of the visibility signal.
    ///
    /// A `false -> true` edge starts a new epoch and plans one entrance per node,
    /// staggered by effective delay. A `true -> false` edge cancels pending work and
    /// hides every shown node with zero delay. Repeating the current value yields
    /// nothing.
    #[tracing::instrument(skip(self), fields(epoch = self.epoch))]
    pub fn schedule(&mut self, is_visible: bool, now: Millis) -> Vec<ActivationCommand> {
        if self.torn_down {
            return Vec::new();
        }
        self.now = self.now.max(now);
        match (self.is_active(), is_visible) {
            (false, true) => self.begin_epoch(now),
            (true, false) => self.reverse(now),
            _ => Vec::new(),
        }
    }

    fn begin_epoch(&mut self, now: Millis) -> Vec<ActivationCommand> {
        self.epoch += 1;
        self.epoch_started = Some(now);
        tracing::debug!(epoch = self.epoch, at = now.0, "visibility epoch started");

        let epoch = self.epoch;
        let mut out = Vec::with_capacity(self.records.len());
        for id in self.tree.ids() {
            let Some(rec) = self.records.get_mut(&id) else {
                continue;
            };
            // Already shown or on its way in this epoch.
            if rec.state != NodeState::Hidden {
                continue;
            }
            let delay = rec.effective_delay;
            arm(rec, epoch);
            self.timers.schedule(
                now.saturating_add(delay),
                Pending {
                    node: id.clone(),
                    target: VariantKey::Visible,
                },
            );
            out.push(ActivationCommand {
                node: id,
                target: VariantKey::Visible,
                delay,
            });
        }
        out
    }

    fn reverse(&mut self, now: Millis) -> Vec<ActivationCommand> {
        let cancelled = self.timers.clear();
        self.epoch_started = None;
        tracing::debug!(epoch = self.epoch, cancelled, "visibility lost; hiding");

        let mut out = Vec::new();
        for id in self.tree.ids() {
            let Some(node) = self.tree.find(&id) else {
                continue;
            };
            let Some(rec) = self.records.get(&id) else {
                continue;
            };
            if rec.state == NodeState::Hidden {
                continue;
            }
            let from = style_of(node, rec, now);
            if let Some(rec) = self.records.get_mut(&id) {
                rec.state = NodeState::Hidden;
                rec.started_at = None;
                rec.reversed_from = Some((now, from));
            }
            self.timers.schedule(
                now,
                Pending {
                    node: id.clone(),
                    target: VariantKey::Hidden,
                },
            );
            out.push(ActivationCommand {
                node: id,
                target: VariantKey::Hidden,
                delay: Millis::ZERO,
            });
        }
        out
    }

    /// Deliver every command due at or before `now` and settle finished entrances.
    pub fn advance(&mut self, now: Millis) -> Vec<FiredActivation> {
        if self.torn_down {
            return Vec::new();
        }
        self.now = self.now.max(now);

        let mut fired = Vec::new();
        for (at, pending) in self.timers.drain_due(now) {
            let Some(rec) = self.records.get_mut(&pending.node) else {
                continue;
            };
            if pending.target == VariantKey::Visible {
                rec.started_at = Some(at);
                rec.has_fired_once = true;
                rec.reversed_from = None;
            }
            fired.push(FiredActivation {
                node: pending.node,
                target: pending.target,
                at,
            });
        }

        for rec in self.records.values_mut() {
            if rec.state != NodeState::Animating {
                continue;
            }
            let Some(started) = rec.started_at else {
                continue;
            };
            let duration = self
                .tree
                .find(&rec.node)
                .map(|n| n.variants.visible.transition.duration)
                .unwrap_or(Millis::ZERO);
            if now >= started.saturating_add(duration) {
                rec.state = NodeState::Visible;
            }
        }
        fired
    }

    /// Append `node` (and its subtree) as the last child of `parent`.
    ///
    /// While an epoch is active the new nodes are planned against the epoch's start:
    /// entrances whose time already passed are due immediately, the rest wait for the
    /// remaining delay.
    pub fn insert_child(
        &mut self,
        parent: &NodeId,
        node: AnimationNode,
        now: Millis,
    ) -> RevealResult<Vec<ActivationCommand>> {
        if self.torn_down {
            return Ok(Vec::new());
        }
        node.validate()?;
        for id in node.ids() {
            if self.records.contains_key(&id) {
                return Err(RevealError::validation(format!(
                    "node id '{id}' already exists in the tree"
                )));
            }
        }
        let Some(parent_rec) = self.records.get(parent) else {
            return Err(RevealError::validation(format!(
                "unknown parent node '{parent}'"
            )));
        };
        let parent_is_root = parent_rec.parent.is_none();
        let parent_delay = parent_rec.effective_delay;
        let depth = self.plan_depth(parent) + 1;

        let Some(parent_node) = self.tree.find_mut(parent) else {
            return Err(RevealError::validation(format!(
                "unknown parent node '{parent}'"
            )));
        };
        let index = parent_node.children.len();
        let base = children_base(parent_node, parent_delay, parent_is_root);
        let effective = child_delay(parent_node, base, index, &node);

        let mut planned = Vec::with_capacity(node.node_count());
        plan_subtree(&node, Some(parent), index, depth, effective, false, &mut planned);
        parent_node.children.push(node);

        self.now = self.now.max(now);
        let mut out = Vec::new();
        for p in planned {
            let id = p.id.clone();
            let mut rec = hidden_record(p);
            if let Some(started) = self.epoch_started {
                let due = started.saturating_add(rec.effective_delay);
                let delay = due.saturating_sub(now);
                arm(&mut rec, self.epoch);
                self.timers.schedule(
                    now.saturating_add(delay),
                    Pending {
                        node: id.clone(),
                        target: VariantKey::Visible,
                    },
                );
                out.push(ActivationCommand {
                    node: id.clone(),
                    target: VariantKey::Visible,
                    delay,
                });
            }
            self.records.insert(id, rec);
        }
        tracing::debug!(%parent, added = out.len(), "inserted dynamic child");
        Ok(out)
    }

    /// Remove a non-root node and its subtree, cancelling its pending commands.
    /// Returns how many nodes were removed.
    pub fn remove_node(&mut self, id: &NodeId) -> usize {
        if self.torn_down || *id == self.tree.id {
            return 0;
        }
        let Some(removed) = self.tree.remove_descendant(id) else {
            return 0;
        };
        let gone: BTreeSet<NodeId> = removed.ids().into_iter().collect();
        self.timers.cancel_where(|p| gone.contains(&p.node));
        for g in &gone {
            self.records.remove(g);
        }
        self.replan();
        gone.len()
    }

    /// Drop every pending command and plan again from a fresh measurement, as when
    /// the observed element is replaced.
    ///
    /// Entrances that were scheduled but not delivered go back to hidden. A visible
    /// signal then starts a new epoch for every hidden node; a hidden one hides the
    /// nodes that were already shown.
    #[tracing::instrument(skip(self), fields(epoch = self.epoch))]
    pub fn restart(&mut self, is_visible: bool, now: Millis) -> Vec<ActivationCommand> {
        if self.torn_down {
            return Vec::new();
        }
        self.now = self.now.max(now);
        let cancelled = self.cancel_pending();
        tracing::debug!(cancelled, "pending commands dropped for restart");
        if is_visible {
            self.begin_epoch(now)
        } else {
            self.reverse(now)
        }
    }

    /// Cancel every pending command and end the current epoch. Returns how many
    /// commands were cancelled.
    pub fn cancel_pending(&mut self) -> usize {
        let cancelled = self.timers.clear();
        self.epoch_started = None;
        for rec in self.records.values_mut() {
            if rec.state == NodeState::Animating && rec.started_at.is_none() {
                rec.state = NodeState::Hidden;
            }
        }
        cancelled
    }

    // Bring every record's delay back in line with the tree's current sibling
    // indices. Undelivered entrances of the running epoch move to their new slot.
    fn replan(&mut self) {
        let mut moved = Vec::new();
        for p in self.tree.plan() {
            let Some(rec) = self.records.get_mut(&p.id) else {
                continue;
            };
            if rec.effective_delay == p.effective_delay {
                continue;
            }
            rec.effective_delay = p.effective_delay;
            if rec.state == NodeState::Animating && rec.started_at.is_none() {
                moved.push((p.id, p.effective_delay));
            }
        }
        let Some(started) = self.epoch_started else {
            return;
        };
        if moved.is_empty() {
            return;
        }
        let ids: BTreeSet<&NodeId> = moved.iter().map(|(id, _)| id).collect();
        self.timers
            .cancel_where(|p| p.target == VariantKey::Visible && ids.contains(&p.node));
        for (id, delay) in &moved {
            self.timers.schedule(
                started.saturating_add(*delay).max(self.now),
                Pending {
                    node: id.clone(),
                    target: VariantKey::Visible,
                },
            );
        }
        tracing::debug!(moved = moved.len(), "entrances moved after removal");
    }

    /// Cancel everything. No command is delivered afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let cancelled = self.timers.clear();
        self.records.clear();
        self.epoch_started = None;
        self.torn_down = true;
        tracing::debug!(cancelled, "scheduler torn down");
    }

    /// Interpolated style of `id` at `now`.
    pub fn style_at(&self, id: &NodeId, now: Millis) -> Option<VisualStyle> {
        let node = self.tree.find(id)?;
        let rec = self.records.get(id)?;
        Some(style_of(node, rec, now))
    }

    fn plan_depth(&self, id: &NodeId) -> usize {
        let mut depth = 0;
        let mut cur = self.records.get(id).and_then(|r| r.parent.clone());
        while let Some(p) = cur {
            depth += 1;
            cur = self.records.get(&p).and_then(|r| r.parent.clone());
        }
        depth
    }
}

impl Drop for StaggerScheduler {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn hidden_record(planned: PlannedNode) -> ActivationRecord {
    ActivationRecord {
        node: planned.id,
        parent: planned.parent,
        state: NodeState::Hidden,
        effective_delay: planned.effective_delay,
        has_fired_once: false,
        scheduled_epoch: None,
        started_at: None,
        reversed_from: None,
    }
}

fn arm(rec: &mut ActivationRecord, epoch: u64) {
    rec.state = NodeState::Animating;
    rec.scheduled_epoch = Some(epoch);
    rec.started_at = None;
}

fn progress(since: Millis, duration: Millis, now: Millis) -> f64 {
    if duration.0 == 0 {
        return 1.0;
    }
    (now.saturating_sub(since).0 as f64 / duration.0 as f64).clamp(0.0, 1.0)
}

fn style_of(node: &AnimationNode, rec: &ActivationRecord, now: Millis) -> VisualStyle {
    let hidden = &node.variants.hidden;
    let visible = &node.variants.visible;
    match rec.state {
        NodeState::Visible => visible.style,
        NodeState::Animating => match rec.started_at {
            Some(started) if now >= started => {
                let t = progress(started, visible.transition.duration, now);
                VisualStyle::lerp(&hidden.style, &visible.style, visible.transition.ease.apply(t))
            }
            _ => hidden.style,
        },
        NodeState::Hidden => match rec.reversed_from {
            Some((since, from)) => {
                let t = progress(since, hidden.transition.duration, now);
                VisualStyle::lerp(&from, &hidden.style, hidden.transition.ease.apply(t))
            }
            None => hidden.style,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
