//! Static meal data the plan generators expand from.

use crate::models::meal_plan::{Macros, MealType};

/// One meal of a diet's template week.
#[derive(Debug, Clone, Copy)]
pub struct DietMealTemplate {
    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: u32,
    pub meal_type: MealType,
    pub food_name: &'static str,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub portion: &'static str,
    pub instructions: &'static str,
}

impl DietMealTemplate {
    pub fn macros(&self) -> Macros {
        Macros::whole(self.calories, self.protein, self.carbs, self.fat)
    }
}

const fn meal(
    day_of_week: u32,
    meal_type: MealType,
    food_name: &'static str,
    macros: [u32; 4],
    portion: &'static str,
    instructions: &'static str,
) -> DietMealTemplate {
    DietMealTemplate {
        day_of_week,
        meal_type,
        food_name,
        calories: macros[0],
        protein: macros[1],
        carbs: macros[2],
        fat: macros[3],
        portion,
        instructions,
    }
}

use MealType::{Breakfast, Dinner, Lunch, Snack};

const KETO: &[DietMealTemplate] = &[
    meal(
        1,
        Breakfast,
        "Avocado Omelette",
        [420, 18, 6, 38],
        "2 eggs, 1/2 avocado, butter",
        "Cook the eggs in butter and serve with sliced avocado.",
    ),
    meal(
        1,
        Lunch,
        "Grilled Salmon Salad",
        [380, 32, 8, 26],
        "150g salmon, leafy greens, olive oil",
        "Grill the salmon and lay it over the greens.",
    ),
    meal(
        1,
        Dinner,
        "Creamy Mushroom Chicken",
        [450, 35, 5, 33],
        "200g chicken breast, mushrooms, cream",
        "Cook the chicken, then make the sauce with mushrooms and cream.",
    ),
    meal(
        1,
        Snack,
        "Walnuts and Cheese",
        [280, 12, 3, 25],
        "30g walnuts, 50g cheddar",
        "Eat as a simple snack.",
    ),
    meal(
        2,
        Breakfast,
        "Keto Smoothie",
        [380, 15, 8, 35],
        "Coconut milk, avocado, protein powder",
        "Blend everything together.",
    ),
    meal(
        2,
        Lunch,
        "Tuna Salad",
        [350, 28, 6, 24],
        "120g tuna, mayonnaise, cucumber",
        "Mix the tuna with mayonnaise and add cucumber.",
    ),
    meal(
        2,
        Dinner,
        "Lamb Chops",
        [480, 40, 2, 34],
        "200g lamb chops, rosemary",
        "Marinate the chops with rosemary and grill them.",
    ),
];

const MEDITERRANEAN: &[DietMealTemplate] = &[
    meal(
        1,
        Breakfast,
        "Greek Yoghurt with Hazelnuts",
        [320, 20, 25, 16],
        "200g Greek yoghurt, 30g hazelnuts, honey",
        "Top the yoghurt with hazelnuts and honey.",
    ),
    meal(
        1,
        Lunch,
        "Mediterranean Salad",
        [380, 12, 35, 22],
        "Tomato, cucumber, olives, feta, olive oil",
        "Chop the vegetables and dress with olive oil.",
    ),
    meal(
        1,
        Dinner,
        "Baked Sea Bass",
        [420, 35, 20, 22],
        "200g sea bass, potatoes, olive oil, lemon",
        "Bake the sea bass together with the potatoes.",
    ),
    meal(
        1,
        Snack,
        "Olives and Feta",
        [180, 8, 5, 15],
        "50g feta, 10 olives",
        "A simple Mediterranean snack.",
    ),
];

const VEGAN: &[DietMealTemplate] = &[
    meal(
        1,
        Breakfast,
        "Chia Pudding",
        [280, 12, 32, 14],
        "Chia seeds, almond milk, banana",
        "Stir the chia into almond milk and let it set in the fridge.",
    ),
    meal(
        1,
        Lunch,
        "Quinoa Bowl",
        [420, 16, 65, 12],
        "Quinoa, chickpeas, vegetables, tahini sauce",
        "Cook the quinoa and toss with vegetables and chickpeas.",
    ),
    meal(
        1,
        Dinner,
        "Lentil Curry",
        [380, 18, 55, 10],
        "Red lentils, coconut milk, spices",
        "Simmer the lentils with spices, then add coconut milk.",
    ),
    meal(
        1,
        Snack,
        "Hummus and Crudités",
        [150, 6, 18, 6],
        "Hummus, carrot, cucumber",
        "Dip the vegetables in hummus.",
    ),
];

const PALEO: &[DietMealTemplate] = &[
    meal(
        1,
        Breakfast,
        "Paleo Omelette",
        [350, 25, 8, 25],
        "3 eggs, vegetables, coconut oil",
        "Cook the eggs with the vegetables.",
    ),
    meal(
        1,
        Lunch,
        "Grilled Beef Salad",
        [450, 35, 12, 30],
        "200g beef, leafy greens, avocado",
        "Grill the beef and serve it over the salad.",
    ),
    meal(
        1,
        Dinner,
        "Roast Chicken and Vegetables",
        [420, 40, 15, 22],
        "200g chicken, broccoli, sweet potato",
        "Roast the chicken and vegetables together.",
    ),
    meal(
        1,
        Snack,
        "Almonds and Apple",
        [200, 6, 15, 14],
        "30g almonds, 1 medium apple",
        "A simple paleo snack.",
    ),
];

const INTERMITTENT_FASTING: &[DietMealTemplate] = &[
    meal(
        1,
        Lunch,
        "Protein Bowl",
        [450, 35, 40, 18],
        "Chicken breast, quinoa, vegetables",
        "First meal at 12:00. Cook the chicken and serve with quinoa.",
    ),
    meal(
        1,
        Snack,
        "Greek Yoghurt",
        [180, 15, 12, 8],
        "150g Greek yoghurt, berries",
        "Afternoon snack at 15:30.",
    ),
    meal(
        1,
        Dinner,
        "Salmon and Vegetables",
        [480, 38, 25, 26],
        "200g salmon, steamed vegetables, bulgur",
        "Last meal at 19:00. Grill the salmon.",
    ),
];

const LOW_CARB: &[DietMealTemplate] = &[
    meal(
        1,
        Breakfast,
        "Cheese Omelette",
        [320, 22, 4, 24],
        "2 eggs, cheddar, spinach",
        "Cook the eggs with spinach and cheese.",
    ),
    meal(
        1,
        Lunch,
        "Chicken Salad",
        [380, 32, 12, 22],
        "150g chicken breast, mixed salad, olive oil",
        "Grill the chicken and serve with the salad.",
    ),
    meal(
        1,
        Dinner,
        "Grilled Fish",
        [400, 35, 8, 25],
        "200g sea bass, grilled vegetables",
        "Grill the fish and serve with the vegetables.",
    ),
    meal(
        1,
        Snack,
        "Hazelnuts and Cheese",
        [220, 10, 6, 18],
        "30g hazelnuts, 40g feta",
        "A low-carb snack.",
    ),
];

/// Template week for a diet type, if one exists.
pub fn template_for(diet_type: &str) -> Option<&'static [DietMealTemplate]> {
    match diet_type {
        "keto" => Some(KETO),
        "mediterranean" => Some(MEDITERRANEAN),
        "vegan" => Some(VEGAN),
        "paleo" => Some(PALEO),
        "intermittent_fasting" => Some(INTERMITTENT_FASTING),
        "low_carb" => Some(LOW_CARB),
        _ => None,
    }
}

pub const TEMPLATE_DIET_TYPES: &[&str] = &[
    "keto",
    "mediterranean",
    "vegan",
    "paleo",
    "intermittent_fasting",
    "low_carb",
];

/// A dish of the rotating menus used for dated plans.
#[derive(Debug, Clone, Copy)]
pub struct MenuDish {
    pub name: &'static str,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub instructions: &'static str,
}

const fn dish(
    name: &'static str,
    protein: u32,
    carbs: u32,
    fat: u32,
    instructions: &'static str,
) -> MenuDish {
    MenuDish {
        name,
        protein,
        carbs,
        fat,
        instructions,
    }
}

/// Per-meal-type dishes; each day picks `day_index % len`.
#[derive(Debug, Clone, Copy)]
pub struct RotatingMenu {
    pub breakfast: &'static [MenuDish],
    pub lunch: &'static [MenuDish],
    pub dinner: &'static [MenuDish],
    pub snack: &'static [MenuDish],
}

impl RotatingMenu {
    pub fn dishes(&self, meal_type: MealType) -> &'static [MenuDish] {
        match meal_type {
            MealType::Breakfast => self.breakfast,
            MealType::Lunch => self.lunch,
            MealType::Dinner => self.dinner,
            MealType::Snack => self.snack,
        }
    }
}

const KETOGENIC_MENU: RotatingMenu = RotatingMenu {
    breakfast: &[
        dish(
            "Avocado Omelette",
            18,
            6,
            38,
            "Cook the eggs in butter and serve with sliced avocado.",
        ),
        dish("Keto Smoothie", 15, 8, 35, "Blend coconut milk, avocado and protein powder."),
        dish("Cheesy Scrambled Eggs", 20, 4, 32, "Scramble the eggs with cheddar."),
        dish("Keto Pancakes", 16, 5, 28, "Make pancakes with almond flour."),
        dish("Sausage and Eggs", 22, 3, 35, "Fry the sausages and eggs together."),
        dish("Butter Coffee", 12, 4, 30, "Stir butter and MCT oil into the coffee."),
        dish("Keto Chia Pudding", 14, 6, 32, "Stir chia seeds into coconut milk."),
    ],
    lunch: &[
        dish("Grilled Salmon Salad", 32, 8, 26, "Grill the salmon and lay it over the greens."),
        dish("Tuna Salad", 28, 6, 24, "Mix the tuna with mayonnaise and add cucumber."),
        dish("Chicken Caesar Salad", 30, 7, 28, "Make a caesar salad with grilled chicken."),
        dish("Keto Burger Bowl", 35, 8, 30, "Serve meatballs over a salad bowl."),
        dish("Avocado Tuna Bowl", 26, 9, 32, "Mix tuna with avocado."),
        dish("Keto Wrap", 24, 6, 28, "Wrap the filling in lettuce leaves."),
        dish("Cheesy Vegetable Gratin", 22, 10, 26, "Bake the vegetables under cheese."),
    ],
    dinner: &[
        dish(
            "Creamy Mushroom Chicken",
            35,
            5,
            33,
            "Cook the chicken, then make the sauce with mushrooms and cream.",
        ),
        dish("Lamb Chops", 40, 2, 34, "Marinate the chops with rosemary and grill them."),
        dish("Grilled Sea Bass", 38, 4, 28, "Grill the sea bass and finish with olive oil."),
        dish("Keto Meatballs", 32, 6, 30, "Serve the meatballs with a cream sauce."),
        dish("Baked Salmon", 36, 3, 32, "Bake the salmon and serve with butter."),
        dish("Grilled Steak", 42, 2, 28, "Grill the steak."),
        dish("Keto Casserole", 28, 8, 35, "Bake meat and vegetables as a casserole."),
    ],
    snack: &[
        dish("Walnuts and Cheese", 12, 3, 25, "Eat as a simple snack."),
        dish("Avocado Slices", 8, 4, 22, "Slice the avocado and season with salt."),
        dish("Keto Fat Bomb", 6, 2, 28, "Make fat bombs with coconut oil."),
        dish("Cheese Cubes", 14, 2, 20, "Cut the cheddar into cubes."),
        dish("Almond Butter", 10, 3, 24, "Eat the almond butter by the spoonful."),
        dish("Keto Shake", 12, 4, 26, "Blend avocado and protein powder."),
        dish("Olives and Feta", 8, 3, 18, "Serve olives with feta."),
    ],
};

const MEDITERRANEAN_MENU: RotatingMenu = RotatingMenu {
    breakfast: &[
        dish(
            "Greek Yoghurt with Hazelnuts",
            20,
            25,
            16,
            "Top the yoghurt with hazelnuts and honey.",
        ),
        dish("Olive Oil Omelette", 18, 8, 22, "Cook the eggs in olive oil."),
        dish(
            "Wholegrain Bread and Cheese",
            16,
            35,
            12,
            "Serve wholegrain bread with white cheese.",
        ),
    ],
    lunch: &[
        dish(
            "Mediterranean Salad",
            12,
            35,
            22,
            "Toss tomato, cucumber, olives and feta in olive oil.",
        ),
        dish("Grilled Fish", 35, 15, 20, "Grill the fish and serve with lemon."),
        dish("Lentil Salad", 18, 45, 15, "Boil the lentils and mix with vegetables."),
    ],
    dinner: &[
        dish("Baked Sea Bass", 35, 20, 22, "Bake the sea bass together with the potatoes."),
        dish(
            "Mediterranean Grilled Chicken",
            40,
            15,
            18,
            "Marinate the chicken with Mediterranean spices.",
        ),
        dish("Vegetable Stew", 15, 45, 20, "Stew the vegetables in olive oil."),
    ],
    snack: &[
        dish("Olives and Cheese", 8, 5, 15, "A simple Mediterranean snack."),
        dish("Nuts and Dried Fruit", 6, 18, 12, "Mixed nuts with dried fruit."),
        dish("Hummus and Vegetables", 8, 15, 10, "Serve hummus with fresh vegetables."),
    ],
};

const DEFAULT_MENU: RotatingMenu = RotatingMenu {
    breakfast: &[
        dish("Porridge", 12, 45, 8, "Cook the oats in milk and add fruit."),
        dish("Protein Smoothie", 20, 30, 8, "Blend protein powder, banana and milk."),
        dish(
            "Omelette and Wholegrain Toast",
            18,
            32,
            12,
            "Serve the omelette with wholegrain toast.",
        ),
    ],
    lunch: &[
        dish("Grilled Chicken Salad", 35, 20, 15, "Grill the chicken and serve with salad."),
        dish("Quinoa Salad", 18, 50, 12, "Make a vegetable salad with quinoa."),
        dish("Fish and Rice", 30, 45, 15, "Cook the fish and serve with rice."),
    ],
    dinner: &[
        dish("Salmon and Vegetables", 28, 15, 18, "Bake the salmon and serve with vegetables."),
        dish("Grilled Meat and Salad", 35, 12, 20, "Grill the meat and serve with salad."),
        dish("Chicken Stew", 32, 25, 16, "Make a chicken and vegetable stew."),
    ],
    snack: &[
        dish("Yoghurt and Fruit", 8, 15, 6, "Yoghurt with fresh fruit."),
        dish("Almonds and Apple", 6, 12, 10, "Almonds with an apple."),
        dish("Protein Bar", 12, 8, 8, "A homemade protein bar."),
    ],
};

/// Rotating menu for a diet type; unknown types get the generic menu.
pub fn rotating_menu_for(diet_type: &str) -> &'static RotatingMenu {
    match diet_type {
        "keto" | "ketogenic" => &KETOGENIC_MENU,
        "mediterranean" => &MEDITERRANEAN_MENU,
        _ => &DEFAULT_MENU,
    }
}

/// Share of the daily calories each meal type receives in rotating menus.
pub fn calorie_share(meal_type: MealType) -> f64 {
    match meal_type {
        MealType::Breakfast => 0.25,
        MealType::Lunch => 0.35,
        MealType::Dinner => 0.30,
        MealType::Snack => 0.10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_diet_has_day_one_meals() {
        for diet in TEMPLATE_DIET_TYPES {
            let template = template_for(diet).unwrap();
            assert!(template.iter().any(|m| m.day_of_week == 1), "{diet}");
        }
        assert!(template_for("carnivore").is_none());
    }

    #[test]
    fn rotating_menus_are_never_empty() {
        for diet in ["keto", "mediterranean", "anything"] {
            let menu = rotating_menu_for(diet);
            for meal_type in MealType::ALL {
                assert!(!menu.dishes(meal_type).is_empty());
            }
        }
    }

    #[test]
    fn multi_line_rows_keep_their_fields() {
        let omelette = KETO[0];
        assert_eq!((omelette.day_of_week, omelette.meal_type), (1, MealType::Breakfast));
        assert_eq!(omelette.food_name, "Avocado Omelette");
        assert_eq!(
            (omelette.calories, omelette.protein, omelette.carbs, omelette.fat),
            (420, 18, 6, 38)
        );
        assert_eq!(omelette.portion, "2 eggs, 1/2 avocado, butter");

        let chicken = MEDITERRANEAN_MENU.dinner[1];
        assert_eq!(chicken.name, "Mediterranean Grilled Chicken");
        assert_eq!((chicken.protein, chicken.carbs, chicken.fat), (40, 15, 18));
        assert_eq!(chicken.instructions, "Marinate the chicken with Mediterranean spices.");

        let toast = DEFAULT_MENU.breakfast[2];
        assert_eq!(toast.name, "Omelette and Wholegrain Toast");
        assert_eq!((toast.protein, toast.carbs, toast.fat), (18, 32, 12));
    }

    #[test]
    fn calorie_shares_cover_the_day() {
        let total: f64 = MealType::ALL.iter().map(|t| calorie_share(*t)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
