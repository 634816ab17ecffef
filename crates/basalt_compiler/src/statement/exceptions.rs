//! `try`/`catch`/`finally`.
//!
//! ```text
//! TRY catch, finally
//!   block
//!   ENDTRY end
//! catch:
//!   store exception
//!   handler
//!   ENDTRY end
//! finally:
//!   block
//!   ENDFINALLY
//! end:
//! ```

use basalt_foundation::{Result, Type};

use super::FoldContext;
use crate::ast::{Block, CatchClause, NodeRef};
use crate::operation::{JumpTarget, Operation, SentinelId};

impl FoldContext<'_> {
    pub(super) fn try_statement(
        &mut self,
        block: &Block,
        catch: Option<&CatchClause>,
        finally: Option<&Block>,
        node: NodeRef,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        if catch.is_none() && finally.is_none() {
            self.fail("try requires catch or finally", node);
            return Ok(());
        }

        let catch_label = catch.map(|_| self.fresh());
        let finally_label = finally.map(|_| self.fresh());
        let end = self.fresh();
        ops.push(Operation::Try {
            catch: catch_label.map(JumpTarget::Pending),
            finally: finally_label.map(JumpTarget::Pending),
        });

        self.try_depth += 1;
        let protected = self.protected(block, catch.zip(catch_label), end, ops);
        self.try_depth -= 1;
        protected?;

        if let (Some(finally), Some(label)) = (finally, finally_label) {
            ops.push(Operation::Sentinel(label));
            self.finally_depth += 1;
            let result = self.block(finally, ops);
            self.finally_depth -= 1;
            result?;
            ops.push(Operation::EndFinally);
        }

        ops.push(Operation::Sentinel(end));
        Ok(())
    }

    /// The try block and its handler, both inside the protected region.
    fn protected(
        &mut self,
        block: &Block,
        catch: Option<(&CatchClause, SentinelId)>,
        end: SentinelId,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        self.block(block, ops)?;
        ops.push(Operation::EndTry(JumpTarget::Pending(end)));

        let Some((clause, label)) = catch else {
            return Ok(());
        };
        ops.push(Operation::Sentinel(label));
        self.scoped(|cx| {
            match &clause.binding {
                Some(ident) => {
                    let store = cx.bind_name(ident, &Type::Any)?;
                    ops.push(store);
                }
                None => ops.push(Operation::Drop),
            }
            cx.block(&clause.block, ops)
        })?;
        ops.push(Operation::EndTry(JumpTarget::Pending(end)));
        Ok(())
    }
}
