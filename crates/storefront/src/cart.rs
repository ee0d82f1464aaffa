//! Cart actions: add, update, remove, and the quantity steppers.
//!
//! The page changes only after the backend confirms a mutation. A rejected
//! or failed request leaves counts, lines and totals exactly as they were
//! and shows a toast instead.

use tracing::{info, instrument, warn};

use nutriharvest_core::{CartItemId, Price, ProductId};

use crate::api::CartMutation;
use crate::error::{Result, StorefrontError, add_breadcrumb};
use crate::page::{Page, Step};
use crate::session::LOGIN_PATH;
use crate::state::PageState;

const ADD_FAILED: &str = "An error occurred while adding to cart";
const UPDATE_FAILED: &str = "An error occurred while updating cart";
const REMOVE_FAILED: &str = "An error occurred while removing item";

/// Drives the cart regions of a page.
#[derive(Clone)]
pub struct CartController {
    state: PageState,
}

impl CartController {
    #[must_use]
    pub const fn new(state: PageState) -> Self {
        Self { state }
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::LoginRequired`] for anonymous visitors
    /// (who are sent to the login page), or the API failure.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<CartMutation> {
        let id = product_id.to_string();
        add_breadcrumb("cart", "Add to cart", Some(&[("product_id", id.as_str())]));

        if !self.state.session().is_authenticated() {
            self.state.toaster().warning("Please login to add items to cart");
            self.state.page().update(|page| page.redirect(LOGIN_PATH));
            return Err(StorefrontError::LoginRequired);
        }

        match self.state.api().add_to_cart(product_id, quantity).await {
            Ok(mutation) => {
                info!(cart_count = ?mutation.cart_count, "Added to cart");
                self.state.toaster().success(mutation.message.clone());
                if let Some(count) = mutation.cart_count {
                    self.state.page().update(|page| show_cart_count(page, count));
                }
                Ok(mutation)
            }
            Err(e) => {
                warn!(error = %e, "Add to cart failed");
                self.state.toaster().error(e.user_message(ADD_FAILED));
                Err(e.into())
            }
        }
    }

    /// Add the quantity chosen on a product detail page (1 when the page
    /// has no quantity input).
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_to_cart`].
    pub async fn add_from_product_page(&self, product_id: ProductId) -> Result<CartMutation> {
        let quantity = self
            .state
            .page()
            .read(|page| page.product_quantity.map_or(1, |input| input.value));
        self.add_to_cart(product_id, quantity).await
    }

    /// Set a cart line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns the API failure; the page is left untouched.
    #[instrument(skip(self))]
    pub async fn update_cart(&self, cart_item_id: CartItemId, quantity: i64) -> Result<()> {
        match self.state.api().update_cart(cart_item_id, quantity).await {
            Ok(mutation) => {
                info!("Cart updated");
                self.state.toaster().success(mutation.message);
                self.state.page().update(|page| {
                    match u32::try_from(quantity) {
                        Ok(value) if value > 0 => {
                            if let Some(line) = page.cart_lines.iter_mut().find(|l| l.id == cart_item_id) {
                                line.quantity.value = value;
                            }
                        }
                        _ => page.cart_lines.retain(|l| l.id != cart_item_id),
                    }
                    recompute_totals(page);
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Cart update failed");
                self.state.toaster().error(e.user_message(UPDATE_FAILED));
                Err(e.into())
            }
        }
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns the API failure; the page is left untouched.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<()> {
        match self.state.api().remove_from_cart(cart_item_id).await {
            Ok(mutation) => {
                info!("Removed from cart");
                self.state.toaster().success(mutation.message);
                self.state.page().update(|page| {
                    page.cart_lines.retain(|l| l.id != cart_item_id);
                    recompute_totals(page);
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Cart removal failed");
                self.state.toaster().error(e.user_message(REMOVE_FAILED));
                Err(e.into())
            }
        }
    }

    /// Press a stepper on a cart line.
    ///
    /// Returns `Ok(false)` when the press is at a bound and nothing was
    /// sent; otherwise the new quantity is sent with [`Self::update_cart`].
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::MissingElement`] for an unknown line, or
    /// the update failure.
    pub async fn step_line(&self, cart_item_id: CartItemId, step: Step) -> Result<bool> {
        let next = self.state.page().read(|page| {
            page.cart_lines
                .iter()
                .find(|l| l.id == cart_item_id)
                .map(|line| {
                    let mut input = line.quantity;
                    input.step(step).then_some(input.value)
                })
        });

        match next {
            None => Err(StorefrontError::MissingElement("cart line")),
            Some(None) => Ok(false),
            Some(Some(value)) => {
                self.update_cart(cart_item_id, i64::from(value)).await?;
                Ok(true)
            }
        }
    }

    /// Press a stepper on the product page quantity input.
    ///
    /// Only the input changes; the value is used by the next
    /// [`Self::add_from_product_page`].
    pub fn step_product(&self, step: Step) -> bool {
        self.state.page().update(|page| {
            page.product_quantity
                .as_mut()
                .is_some_and(|input| input.step(step))
        })
    }
}

/// Write the cart count to every badge. A zero count never hides a badge.
fn show_cart_count(page: &mut Page, count: u32) {
    for badge in &mut page.cart_badges {
        badge.text = count.to_string();
        if count > 0 {
            badge.visible = true;
        }
    }
}

/// Rewrite every total node from the remaining lines.
fn recompute_totals(page: &mut Page) {
    let total: Price = page
        .cart_lines
        .iter()
        .map(|line| line.unit_price.times(i64::from(line.quantity.value)))
        .sum();
    let text = total.to_string();
    for node in &mut page.cart_totals {
        node.clone_from(&text);
    }
}
