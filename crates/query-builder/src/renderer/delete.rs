use crate::{ast::delete::Delete, renderer::Render};

impl Render for Delete {
    fn render(&self, r: &mut super::Renderer) {
        r.sql.push_str("DELETE FROM ");
        r.render_table_ref(&self.table);
        r.sql.push(';');
    }
}
