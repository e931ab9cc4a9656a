use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResult {
    None,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveAction {
    ResetDashboard,
}

impl DestructiveAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::ResetDashboard => "Reset the dashboard layout and remove every added card",
        }
    }

    pub fn warning(self) -> &'static str {
        "This action cannot be undone."
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmationModal {
    open: bool,
    pending: Option<DestructiveAction>,
    description: String,
    warning: String,
}

impl Default for ConfirmationModal {
    fn default() -> Self {
        Self {
            open: false,
            pending: None,
            description: String::new(),
            warning: "This action cannot be undone.".into(),
        }
    }
}

impl ConfirmationModal {
    pub fn open_for(&mut self, kind: DestructiveAction) {
        self.description = kind.label().into();
        self.warning = kind.warning().into();
        self.pending = Some(kind);
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pending(&self) -> Option<DestructiveAction> {
        self.pending
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> ConfirmationResult {
        if !self.open {
            return ConfirmationResult::None;
        }
        let mut result = ConfirmationResult::None;
        let mut open = true;
        egui::Window::new("Confirm destructive action")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(&self.description);
                ui.colored_label(egui::Color32::YELLOW, &self.warning);
                ui.horizontal(|ui| {
                    if ui.button("Confirm").clicked() {
                        result = ConfirmationResult::Confirmed;
                    }
                    if ui.button("Cancel").clicked() {
                        result = ConfirmationResult::Cancelled;
                    }
                });
            });
        if !open && result == ConfirmationResult::None {
            result = ConfirmationResult::Cancelled;
        }
        if result != ConfirmationResult::None {
            self.open = false;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_modal_reports_nothing() {
        let ctx = egui::Context::default();
        let mut modal = ConfirmationModal::default();
        let mut result = ConfirmationResult::Cancelled;
        let _ = ctx.run(Default::default(), |ctx| {
            result = modal.ui(ctx);
        });
        assert_eq!(result, ConfirmationResult::None);
    }

    #[test]
    fn open_for_remembers_action() {
        let mut modal = ConfirmationModal::default();
        modal.open_for(DestructiveAction::ResetDashboard);
        assert!(modal.is_open());
        assert_eq!(modal.pending(), Some(DestructiveAction::ResetDashboard));
    }
}
