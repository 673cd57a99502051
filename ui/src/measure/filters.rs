use dioxus::prelude::*;

use crate::core::format::sex_label;
use crate::data::model::{FilterOptions, ResolvedFilters, SexCode};
use crate::t;

/// Sex and site selectors. Nothing changes until Apply is pressed.
#[component]
pub fn FilterBar(
    options: Option<FilterOptions>,
    current: ResolvedFilters,
    on_apply: EventHandler<(SexCode, String)>,
) -> Element {
    let initial = current.clone();
    let mut sex = use_signal(move || initial.sex);
    let initial = current.clone();
    let mut site = use_signal(move || initial.site);

    let Some(options) = options else {
        return rsx! {
            div { class: "filter-bar filter-bar--loading", {t!("filters-loading")} }
        };
    };

    let sex_options = options.sexes.clone();
    let selected_sex = options
        .sexes
        .iter()
        .position(|option| option.value == sex())
        .unwrap_or(0);
    let changed = sex() != current.sex || site() != current.site;

    rsx! {
        div { class: "filter-bar",
            label { class: "filter-bar__field",
                span { {t!("filters-sex-label")} }
                select {
                    value: "{selected_sex}",
                    onchange: move |evt: FormEvent| {
                        if let Some(choice) = evt
                            .value()
                            .parse::<usize>()
                            .ok()
                            .and_then(|index| sex_options.get(index))
                        {
                            sex.set(choice.value.clone());
                        }
                    },
                    for (index , choice) in options.sexes.iter().enumerate() {
                        option {
                            key: "{index}",
                            value: "{index}",
                            selected: index == selected_sex,
                            "{choice.label}"
                        }
                    }
                }
            }
            label { class: "filter-bar__field",
                span { {t!("filters-site-label")} }
                select {
                    value: "{site()}",
                    onchange: move |evt: FormEvent| site.set(evt.value()),
                    for name in options.sites.iter() {
                        option {
                            key: "{name}",
                            value: "{name}",
                            selected: *name == site(),
                            "{name}"
                        }
                    }
                }
            }
            button {
                r#type: "button",
                class: "button button--primary",
                disabled: !changed,
                onclick: move |_| on_apply.call((sex(), site())),
                {t!("filters-apply")}
            }
            span { class: "filter-bar__summary",
                {t!("filters-showing", sex = sex_label(&current.sex), site = current.site.clone())}
            }
        }
    }
}
