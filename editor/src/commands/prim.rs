use strata_core::abstract_editor::{EditAction, EditActionResult};
use strata_doc::{PrimPath, PrimSpec, Specifier};

use super::{TargetLayer, document_error, not_applied};
use crate::EditSession;

/// Author a new prim spec `name` under `parent`.
#[derive(Debug)]
pub struct PrimNew {
    parent: PrimPath,
    name: String,
    specifier: Specifier,
    target: TargetLayer,
    created: Option<PrimPath>,
}

impl PrimNew {
    pub fn new(parent: PrimPath, name: impl Into<String>, specifier: Specifier) -> Self {
        Self {
            parent,
            name: name.into(),
            specifier,
            target: TargetLayer::default(),
            created: None,
        }
    }
}

impl EditAction<EditSession> for PrimNew {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        let layer = self.target.resolve(session)?;
        let path = session
            .registry_mut()
            .edit(&layer, |c| c.create_prim(&self.parent, &self.name, self.specifier))
            .map_err(document_error)?;
        self.created = Some(path);
        Ok(())
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        let path = self.created.as_ref().ok_or_else(not_applied)?;
        session
            .registry_mut()
            .edit(self.target.applied()?, |c| c.remove_prim(path))
            .map_err(document_error)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "New prim"
    }
}

/// Remove a prim spec and everything under it.
#[derive(Debug)]
pub struct PrimRemove {
    path: PrimPath,
    target: TargetLayer,
    removed: Vec<(PrimPath, PrimSpec)>,
}

impl PrimRemove {
    pub fn new(path: PrimPath) -> Self {
        Self {
            path,
            target: TargetLayer::default(),
            removed: Vec::new(),
        }
    }
}

impl EditAction<EditSession> for PrimRemove {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        let layer = self.target.resolve(session)?;
        self.removed = session
            .registry_mut()
            .edit(&layer, |c| c.remove_prim(&self.path))
            .map_err(document_error)?;
        Ok(())
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        let layer = self.target.applied()?;
        let removed = std::mem::take(&mut self.removed);
        session
            .registry_mut()
            .edit(layer, |c| {
                c.restore_prims(removed);
                Ok(())
            })
            .map_err(document_error)
    }

    fn description(&self) -> &str {
        "Remove prim"
    }
}

/// Rename a prim, moving its subtree. Selected paths follow the rename.
#[derive(Debug)]
pub struct PrimChangeName {
    path: PrimPath,
    new_name: String,
    target: TargetLayer,
    renamed: Option<PrimPath>,
}

impl PrimChangeName {
    pub fn new(path: PrimPath, new_name: impl Into<String>) -> Self {
        Self {
            path,
            new_name: new_name.into(),
            target: TargetLayer::default(),
            renamed: None,
        }
    }
}

impl EditAction<EditSession> for PrimChangeName {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        let layer = self.target.resolve(session)?;
        let new_path = session
            .registry_mut()
            .edit(&layer, |c| c.rename_prim(&self.path, &self.new_name))
            .map_err(document_error)?;
        session.selection_mut().repoint(&self.path, &new_path);
        self.renamed = Some(new_path);
        Ok(())
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        let renamed = self.renamed.as_ref().ok_or_else(not_applied)?;
        let old_name = self.path.name();
        session
            .registry_mut()
            .edit(self.target.applied()?, |c| c.rename_prim(renamed, old_name))
            .map_err(document_error)?;
        session.selection_mut().repoint(renamed, &self.path);
        Ok(())
    }

    fn description(&self) -> &str {
        "Rename prim"
    }
}

/// Change the specifier of a prim spec.
#[derive(Debug)]
pub struct PrimChangeSpecifier {
    path: PrimPath,
    specifier: Specifier,
    target: TargetLayer,
    previous: Option<Specifier>,
}

impl PrimChangeSpecifier {
    pub fn new(path: PrimPath, specifier: Specifier) -> Self {
        Self {
            path,
            specifier,
            target: TargetLayer::default(),
            previous: None,
        }
    }
}

impl EditAction<EditSession> for PrimChangeSpecifier {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        let layer = self.target.resolve(session)?;
        let previous = session
            .registry_mut()
            .edit(&layer, |c| c.set_specifier(&self.path, self.specifier))
            .map_err(document_error)?;
        self.previous = Some(previous);
        Ok(())
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        let previous = self.previous.ok_or_else(not_applied)?;
        session
            .registry_mut()
            .edit(self.target.applied()?, |c| c.set_specifier(&self.path, previous))
            .map_err(document_error)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Change specifier"
    }
}

/// Add a reference to an asset on a prim spec.
#[derive(Debug)]
pub struct PrimAddReference {
    path: PrimPath,
    asset: String,
    target: TargetLayer,
}

impl PrimAddReference {
    pub fn new(path: PrimPath, asset: impl Into<String>) -> Self {
        Self {
            path,
            asset: asset.into(),
            target: TargetLayer::default(),
        }
    }
}

impl EditAction<EditSession> for PrimAddReference {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        let layer = self.target.resolve(session)?;
        session
            .registry_mut()
            .edit(&layer, |c| c.add_reference(&self.path, &self.asset))
            .map_err(document_error)
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        session
            .registry_mut()
            .edit(self.target.applied()?, |c| c.remove_reference(&self.path, &self.asset))
            .map_err(document_error)
    }

    fn description(&self) -> &str {
        "Add reference"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_core::abstract_editor::EditActionError;
    use strata_doc::LayerHandle;

    fn p(s: &str) -> PrimPath {
        PrimPath::parse(s).unwrap()
    }

    fn session_with_stage() -> (tempfile::TempDir, EditSession, LayerHandle) {
        let dir = tempfile::tempdir().unwrap();
        let mut session = EditSession::new();
        session.create_stage(&dir.path().join("stage.strata"));
        let layer = session.edit_target().unwrap();
        (dir, session, layer)
    }

    fn apply(session: &mut EditSession, action: &mut dyn EditAction<EditSession>) {
        action.apply(session).unwrap();
    }

    #[test]
    fn new_prim_needs_a_stage() {
        let mut session = EditSession::new();
        let mut action = PrimNew::new(PrimPath::root(), "World", Specifier::Def);
        assert!(matches!(
            action.apply(&mut session),
            Err(EditActionError::InvalidState(_))
        ));
    }

    #[test]
    fn new_prim_and_undo() {
        let (_dir, mut session, layer) = session_with_stage();
        let mut action = PrimNew::new(PrimPath::root(), "World", Specifier::Def);

        apply(&mut session, &mut action);
        assert!(layer.read(|c| c.has_prim(&p("/World"))));
        action.undo(&mut session).unwrap();
        assert!(!layer.read(|c| c.has_prim(&p("/World"))));
    }

    #[test]
    fn remove_restores_the_subtree() {
        let (_dir, mut session, layer) = session_with_stage();
        apply(&mut session, &mut PrimNew::new(PrimPath::root(), "World", Specifier::Def));
        apply(&mut session, &mut PrimNew::new(p("/World"), "Cube", Specifier::Over));
        let before = layer.read(|c| c.clone());

        let mut remove = PrimRemove::new(p("/World"));
        apply(&mut session, &mut remove);
        assert!(layer.read(|c| c.prims.is_empty()));

        remove.undo(&mut session).unwrap();
        assert_eq!(layer.read(|c| c.clone()), before);
    }

    #[test]
    fn rename_repoints_selection_both_ways() {
        let (_dir, mut session, layer) = session_with_stage();
        apply(&mut session, &mut PrimNew::new(PrimPath::root(), "World", Specifier::Def));
        apply(&mut session, &mut PrimNew::new(p("/World"), "Cube", Specifier::Def));
        session.selection_mut().replace([p("/World/Cube")]);

        let mut rename = PrimChangeName::new(p("/World"), "Scene");
        apply(&mut session, &mut rename);
        assert!(layer.read(|c| c.has_prim(&p("/Scene/Cube"))));
        assert_eq!(session.selection().paths(), [p("/Scene/Cube")]);

        rename.undo(&mut session).unwrap();
        assert!(layer.read(|c| c.has_prim(&p("/World/Cube"))));
        assert_eq!(session.selection().paths(), [p("/World/Cube")]);
    }

    #[test]
    fn specifier_and_reference_undo() {
        let (_dir, mut session, layer) = session_with_stage();
        apply(&mut session, &mut PrimNew::new(PrimPath::root(), "World", Specifier::Def));

        let mut change = PrimChangeSpecifier::new(p("/World"), Specifier::Class);
        apply(&mut session, &mut change);
        assert_eq!(layer.read(|c| c.prim(&p("/World")).unwrap().specifier), Specifier::Class);
        change.undo(&mut session).unwrap();
        assert_eq!(layer.read(|c| c.prim(&p("/World")).unwrap().specifier), Specifier::Def);

        let mut reference = PrimAddReference::new(p("/World"), "set.strata");
        apply(&mut session, &mut reference);
        assert_eq!(layer.read(|c| c.prim(&p("/World")).unwrap().references.len()), 1);
        reference.undo(&mut session).unwrap();
        assert!(layer.read(|c| c.prim(&p("/World")).unwrap().references.is_empty()));
    }

    #[test]
    fn undo_uses_the_layer_written_on_apply() {
        let (dir, mut session, first) = session_with_stage();
        let mut action = PrimNew::new(PrimPath::root(), "World", Specifier::Def);
        apply(&mut session, &mut action);

        session.create_stage(&dir.path().join("other.strata"));
        let other = session.current_stage().map(|s| Arc::clone(s.root_layer()));
        assert_ne!(other.map(|l| l.id()), Some(first.id()));

        action.undo(&mut session).unwrap();
        assert!(!first.read(|c| c.has_prim(&p("/World"))));
    }
}
